//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Level loading
//! and the session lifecycle live in the engine; a tick only reports when the
//! current level has been cleared.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;

use super::level::Level;
use super::player::RESPAWN_DELAY_TICKS;
use super::state::{
    GameEvent, GameState, GameStatus, InputState, OVERTIME_TICKS, PowerUp, PowerUpKind, SnowAttack,
};
use crate::consts::*;

/// Pushing a snowball: flat score and a fresh combo
pub const PUSH_SCORE: u64 = 100;
pub const PUSH_COMBO_WINDOW_TICKS: u32 = 180;
/// Window refreshed by each rolling-snowball kill
pub const COMBO_WINDOW_TICKS: u32 = 120;
pub const MAX_COMBO_MULTIPLIER: u32 = 10;
/// Ticks with no enemies left before the next level loads
pub const LEVEL_CLEAR_DELAY_TICKS: u32 = 120;

const BREAKUP_DROP_CHANCE: f64 = 0.7;
const COMBO_DROP_CHANCE: f64 = 0.6;
const BREAKUP_DROP_LIFT: f32 = 10.0;

/// What the engine has to act on after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    LevelCleared,
}

/// Advance the game state by one fixed timestep
pub fn tick(
    state: &mut GameState,
    level: &Level,
    inputs: &BTreeMap<u32, InputState>,
) -> TickOutcome {
    if state.status != GameStatus::Playing {
        return TickOutcome::Continue;
    }

    state.time_ticks += 1;

    // Level timer refills instead of ending the level
    state.time_remaining = state.time_remaining.saturating_sub(1);
    if state.time_remaining == 0 {
        state.time_remaining = OVERTIME_TICKS;
    }

    if state.combo_timer > 0 {
        state.combo_timer -= 1;
        if state.combo_timer == 0 {
            state.combo = 0;
        }
    }

    update_players(state, level, inputs);
    update_attacks(state);
    update_enemies(state, level);
    update_power_ups(state);

    let outcome = if state.enemies.is_empty() {
        state.level_complete_timer += 1;
        if state.level_complete_timer >= LEVEL_CLEAR_DELAY_TICKS {
            state.level_complete_timer = 0;
            TickOutcome::LevelCleared
        } else {
            TickOutcome::Continue
        }
    } else {
        state.level_complete_timer = 0;
        TickOutcome::Continue
    };

    if state.all_players_out() {
        log::info!("All players out at tick {}: game over", state.time_ticks);
        state.status = GameStatus::GameOver;
        state.push_event(GameEvent::GameOver);
    }

    // Ensure deterministic ordering
    state.normalize_order();

    if state.status == GameStatus::GameOver {
        TickOutcome::Continue
    } else {
        outcome
    }
}

fn update_players(state: &mut GameState, level: &Level, inputs: &BTreeMap<u32, InputState>) {
    for index in 0..state.players.len() {
        let id = state.players[index].id;
        let input = inputs.get(&id).copied().unwrap_or_default();

        if state.players[index].is_dead() {
            let player = &mut state.players[index];
            player.respawn_timer += 1;
            if player.respawn_timer >= RESPAWN_DELAY_TICKS && player.lives > 0 {
                if let Some(spawn) = level.player_spawn(player.number) {
                    player.respawn(spawn);
                    log::debug!("Player {id} respawned");
                    state.push_event(GameEvent::PlayerRespawned { player: id });
                    continue;
                }
            }
            player.update(&InputState::default(), &level.platforms);
            continue;
        }

        if input.attack && state.players[index].can_attack() {
            spawn_attack(state, index);
        }

        let player = &mut state.players[index];
        player.update(&input, &level.platforms);
        if player.is_dead() {
            let lives_left = player.lives;
            log::debug!("Player {id} fell out of play, {lives_left} lives left");
            state.push_event(GameEvent::PlayerDied {
                player: id,
                lives_left,
            });
        }
    }
}

fn spawn_attack(state: &mut GameState, player_index: usize) {
    if state.attacks.len() >= MAX_ATTACKS {
        log::warn!("Attack cap {MAX_ATTACKS} reached, shot dropped");
        return;
    }
    let id = state.next_entity_id();
    let attack = SnowAttack::fire(id, &state.players[player_index]);
    state.attacks.push(attack);
}

/// Move projectiles, then let every one of them (expired this tick or not)
/// strike before the spent ones are removed
fn update_attacks(state: &mut GameState) {
    let expired: Vec<bool> = state.attacks.iter_mut().map(|a| a.update()).collect();

    let mut frozen = Vec::new();
    let mut survivors = Vec::with_capacity(state.attacks.len());
    for (attack, expired) in std::mem::take(&mut state.attacks).into_iter().zip(expired) {
        let (snowballed, consumed) = attack.strike(&mut state.enemies);
        frozen.extend(snowballed);
        if !expired && !consumed {
            survivors.push(attack);
        }
    }
    state.attacks = survivors;

    for enemy in frozen {
        state.push_event(GameEvent::EnemyFrozen { enemy });
    }
}

fn update_enemies(state: &mut GameState, level: &Level) {
    let mut evicted = Vec::new();

    for index in 0..state.enemies.len() {
        if state.enemies[index].is_dead() {
            if state.enemies[index].update_dead() {
                evicted.push(state.enemies[index].id);
            }
        } else if state.enemies[index].is_rolling() {
            roll_snowball(state, level, index, &mut evicted);
        } else {
            let GameState {
                enemies,
                players,
                rng,
                ..
            } = &mut *state;
            enemies[index].update(&level.platforms, players, rng);
            resolve_player_contacts(state, index);
        }
    }

    if !evicted.is_empty() {
        state.enemies.retain(|e| !evicted.contains(&e.id));
    }
}

fn roll_snowball(state: &mut GameState, level: &Level, index: usize, evicted: &mut Vec<u32>) {
    let broke_up = state.enemies[index].update_rolling(&level.platforms);

    // Still sweeps the pack in the tick it breaks up
    let roller = state.enemies[index].body;
    for other in 0..state.enemies.len() {
        if other == index
            || state.enemies[other].is_dead()
            || !roller.collides(&state.enemies[other].body)
        {
            continue;
        }

        state.combo += 1;
        state.combo_timer = COMBO_WINDOW_TICKS;
        let multiplier = u64::from(state.combo.min(MAX_COMBO_MULTIPLIER));

        let victim = &mut state.enemies[other];
        let score = victim.kill() * multiplier;
        let id = victim.id;
        let at = victim.body.pos;
        award_stray_kill(state, score);
        state.push_event(GameEvent::EnemyKilled {
            enemy: id,
            score,
            combo: state.combo,
        });
        maybe_drop(state, at, COMBO_DROP_CHANCE);
    }

    if broke_up {
        // Base score, no combo
        let enemy = &mut state.enemies[index];
        let score = enemy.kill();
        let id = enemy.id;
        let at = GameState::drop_point(&enemy.body, BREAKUP_DROP_LIFT);
        award_stray_kill(state, score);
        state.push_event(GameEvent::EnemyKilled {
            enemy: id,
            score,
            combo: state.combo,
        });
        maybe_drop(state, at, BREAKUP_DROP_CHANCE);
        evicted.push(id);
    }
}

/// Push touched snowballs; lethal enemies kill vulnerable players
fn resolve_player_contacts(state: &mut GameState, enemy_index: usize) {
    for p in 0..state.players.len() {
        let player = &state.players[p];
        let enemy = &state.enemies[enemy_index];
        if player.is_dead() || player.invincible || !player.body.collides(&enemy.body) {
            continue;
        }

        if enemy.is_snowball() {
            let direction = if player.body.pos.x < enemy.body.pos.x {
                1.0
            } else {
                -1.0
            };
            let (player_id, enemy_id) = (player.id, enemy.id);
            state.enemies[enemy_index].push(direction);
            award(state, p, PUSH_SCORE);
            state.combo = 1;
            state.combo_timer = PUSH_COMBO_WINDOW_TICKS;
            state.push_event(GameEvent::SnowballPushed {
                enemy: enemy_id,
                player: player_id,
            });
        } else if enemy.is_lethal() {
            let player = &mut state.players[p];
            player.die();
            let (id, lives_left) = (player.id, player.lives);
            log::debug!("Player {id} caught by enemy, {lives_left} lives left");
            state.push_event(GameEvent::PlayerDied {
                player: id,
                lives_left,
            });
        }
    }
}

fn update_power_ups(state: &mut GameState) {
    let mut kept = Vec::with_capacity(state.power_ups.len());
    for mut item in std::mem::take(&mut state.power_ups) {
        if item.update() {
            continue;
        }
        let collector = state
            .players
            .iter()
            .position(|p| !p.is_dead() && p.body.collides(&item.body));
        match collector {
            Some(p) => {
                let score = item.apply(&mut state.players[p]);
                award(state, p, score);
                let player = state.players[p].id;
                state.push_event(GameEvent::PowerUpCollected {
                    player,
                    kind: item.kind,
                });
            }
            None => kept.push(item),
        }
    }
    state.power_ups = kept;
}

fn award(state: &mut GameState, player_index: usize, points: u64) {
    let player = &mut state.players[player_index];
    let gained = player.add_score(points);
    let id = player.id;
    for _ in 0..gained {
        log::debug!("Player {id} earned an extra life");
        state.push_event(GameEvent::ExtraLife { player: id });
    }
}

/// Rolling kills are credited to the first living player
fn award_stray_kill(state: &mut GameState, points: u64) {
    if let Some(index) = state.first_living_player() {
        award(state, index, points);
    }
}

fn maybe_drop(state: &mut GameState, at: Vec2, chance: f64) {
    if !state.rng.random_bool(chance) {
        return;
    }
    let kind = PowerUpKind::roll(&mut state.rng);
    if state.power_ups.len() >= MAX_POWERUPS {
        log::warn!("Power-up cap {MAX_POWERUPS} reached, {kind:?} drop discarded");
        return;
    }
    let id = state.next_entity_id();
    let item = PowerUp::spawn(id, kind, at, &mut state.rng);
    state.power_ups.push(item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelCatalog;
    use crate::sim::enemy::ROLL_TIME_LIMIT;
    use crate::sim::state::{Enemy, EnemyKind, EnemyState, Player, PlayerState};

    const FLOOR_TOP: f32 = GROUND_Y - 8.0;

    fn arena() -> (GameState, Level) {
        let level = LevelCatalog::default().get(1).cloned().expect("level 1");
        let mut state = GameState::new(3);
        state.status = GameStatus::Playing;
        let id = state.next_entity_id();
        let spawn = level.player_spawn(1).expect("spawn");
        state.players.push(Player::new(id, 1, spawn));
        (state, level)
    }

    fn add_enemy(state: &mut GameState, x: f32) -> usize {
        let kind = EnemyKind::Red;
        let y = FLOOR_TOP - kind.traits().size.y;
        let enemy = Enemy::new(state.next_entity_id(), kind, Vec2::new(x, y), &mut state.rng);
        state.enemies.push(enemy);
        state.enemies.len() - 1
    }

    fn no_input() -> BTreeMap<u32, InputState> {
        BTreeMap::new()
    }

    #[test]
    fn test_no_op_unless_playing() {
        let (mut state, level) = arena();
        state.status = GameStatus::Paused;
        let before = state.clone();
        tick(&mut state, &level, &no_input());
        assert_eq!(state, before);
    }

    #[test]
    fn test_timer_refills() {
        let (mut state, level) = arena();
        add_enemy(&mut state, 200.0);
        state.time_remaining = 1;
        tick(&mut state, &level, &no_input());
        assert_eq!(state.time_remaining, OVERTIME_TICKS);
    }

    #[test]
    fn test_combo_lapses() {
        let (mut state, level) = arena();
        add_enemy(&mut state, 200.0);
        state.combo = 4;
        state.combo_timer = 2;
        tick(&mut state, &level, &no_input());
        assert_eq!(state.combo, 4);
        tick(&mut state, &level, &no_input());
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_attack_input_spawns_projectile() {
        let (mut state, level) = arena();
        add_enemy(&mut state, 200.0);
        let id = state.players[0].id;
        let mut inputs = BTreeMap::new();
        inputs.insert(
            id,
            InputState {
                attack: true,
                ..Default::default()
            },
        );
        tick(&mut state, &level, &inputs);
        assert_eq!(state.attacks.len(), 1);
        assert_eq!(state.attacks[0].owner, id);
        // Held attack does not fire again during the cooldown
        tick(&mut state, &level, &inputs);
        assert_eq!(state.attacks.len(), 1);
    }

    #[test]
    fn test_push_scores_and_starts_combo() {
        let (mut state, level) = arena();
        let i = add_enemy(&mut state, 0.0);
        let player = state.players[0].body;
        state.enemies[i].freeze(100);
        state.enemies[i].body.pos = Vec2::new(player.pos.x + 4.0, player.pos.y);
        state.players[0].invincible = false;

        tick(&mut state, &level, &no_input());

        assert_eq!(state.enemies[0].state, EnemyState::Rolling);
        assert!(state.enemies[0].body.vel.x > 0.0);
        assert_eq!(state.players[0].score, PUSH_SCORE);
        assert_eq!(state.combo, 1);
        assert_eq!(state.combo_timer, PUSH_COMBO_WINDOW_TICKS);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::SnowballPushed { .. })));
    }

    #[test]
    fn test_lethal_contact_kills_vulnerable_player() {
        let (mut state, level) = arena();
        let i = add_enemy(&mut state, 0.0);
        state.enemies[i].body.pos = state.players[0].body.pos;
        state.enemies[i].body.vel = Vec2::ZERO;
        state.players[0].invincible = false;

        tick(&mut state, &level, &no_input());

        assert_eq!(state.players[0].state, PlayerState::Dead);
        assert_eq!(state.players[0].lives, PLAYER_START_LIVES - 1);
    }

    #[test]
    fn test_invincible_player_survives_contact() {
        let (mut state, level) = arena();
        let i = add_enemy(&mut state, 0.0);
        state.enemies[i].body.pos = state.players[0].body.pos;
        state.players[0].grant_invincibility(10);

        tick(&mut state, &level, &no_input());
        assert!(!state.players[0].is_dead());
    }

    #[test]
    fn test_dead_player_respawns_after_delay() {
        let (mut state, level) = arena();
        add_enemy(&mut state, 200.0);
        state.players[0].die();
        for _ in 0..RESPAWN_DELAY_TICKS - 1 {
            tick(&mut state, &level, &no_input());
            assert!(state.players[0].is_dead());
        }
        tick(&mut state, &level, &no_input());
        assert!(!state.players[0].is_dead());
        assert!(state.players[0].invincible);
    }

    #[test]
    fn test_out_of_lives_ends_game() {
        let (mut state, level) = arena();
        add_enemy(&mut state, 200.0);
        state.players[0].state = PlayerState::Dead;
        state.players[0].lives = 0;
        let outcome = tick(&mut state, &level, &no_input());
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver));
    }

    #[test]
    fn test_rolling_breakup_is_evicted() {
        let (mut state, level) = arena();
        let i = add_enemy(&mut state, GAME_WIDTH + 20.0);
        state.enemies[i].freeze(100);
        state.enemies[i].push(1.0);
        let score_before = state.players[0].score;

        tick(&mut state, &level, &no_input());

        assert!(state.enemies.is_empty());
        assert_eq!(
            state.players[0].score,
            score_before + EnemyKind::Red.traits().kill_score
        );
    }

    #[test]
    fn test_breakup_tick_still_sweeps_neighbours() {
        let (mut state, level) = arena();
        let roller = add_enemy(&mut state, 100.0);
        state.enemies[roller].freeze(100);
        state.enemies[roller].push(1.0);
        state.enemies[roller].roll_timer = ROLL_TIME_LIMIT;
        let victim = add_enemy(&mut state, 106.0);
        state.enemies[victim].body.vel = Vec2::ZERO;
        let (roller_id, victim_id) = (state.enemies[roller].id, state.enemies[victim].id);

        tick(&mut state, &level, &no_input());

        assert_eq!(state.combo, 1);
        assert!(state.enemies.iter().all(|e| e.id != roller_id));
        let killed: Vec<u32> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::EnemyKilled { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect();
        assert_eq!(killed, vec![victim_id, roller_id]);
        assert!(
            state
                .enemies
                .iter()
                .filter(|e| e.id == victim_id)
                .all(|e| e.is_dead())
        );
    }

    #[test]
    fn test_attack_cap_drops_shot() {
        let (mut state, _level) = arena();
        for _ in 0..MAX_ATTACKS {
            let id = state.next_entity_id();
            let attack = SnowAttack::fire(id, &state.players[0]);
            state.attacks.push(attack);
        }
        let before = state.clone();

        spawn_attack(&mut state, 0);

        assert_eq!(state, before);
    }

    #[test]
    fn test_power_up_cap_discards_drop() {
        let (mut state, _level) = arena();
        let at = Vec2::new(120.0, 100.0);
        for _ in 0..MAX_POWERUPS {
            let id = state.next_entity_id();
            let item = PowerUp::spawn(id, PowerUpKind::PotionRed, at, &mut state.rng);
            state.power_ups.push(item);
        }

        maybe_drop(&mut state, at, 1.0);
        assert_eq!(state.power_ups.len(), MAX_POWERUPS);

        state.power_ups.pop();
        maybe_drop(&mut state, at, 1.0);
        assert_eq!(state.power_ups.len(), MAX_POWERUPS);
    }

    #[test]
    fn test_clear_reported_after_delay() {
        let (mut state, level) = arena();
        for _ in 0..LEVEL_CLEAR_DELAY_TICKS - 1 {
            assert_eq!(
                tick(&mut state, &level, &no_input()),
                TickOutcome::Continue
            );
        }
        assert_eq!(
            tick(&mut state, &level, &no_input()),
            TickOutcome::LevelCleared
        );
        assert_eq!(state.level_complete_timer, 0);
    }
}
