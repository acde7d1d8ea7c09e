//! Game state and core simulation types
//!
//! Everything a snapshot must carry lives here, including the RNG, so that a
//! replica restored from a snapshot continues exactly where the host left off.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Body;

/// Top-level session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
    LevelComplete,
    Victory,
}

/// Player lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
    Attacking,
    Dead,
}

/// A controllable snowman
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    /// 1 or 2, fixed at creation
    pub number: u8,
    pub body: Body,
    pub state: PlayerState,
    pub lives: u32,
    pub score: u64,
    pub is_attacking: bool,
    /// Ticks left in the current attack window
    pub attack_timer: u32,
    pub attack_cooldown: u32,
    pub invincible: bool,
    pub invincible_timer: u32,
    pub on_ground: bool,
    pub speed_boost_timer: u32,
    pub power_boost_timer: u32,
    /// Ticks spent dead, drives the delayed respawn
    pub respawn_timer: u32,
}

/// Enemy archetypes; behavior differences are data-driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Red,
    Blue,
    Green,
    Boss,
}

/// Enemy state machine. Frozen tiers are named after the freeze band ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
    Frozen25,
    Frozen50,
    Frozen75,
    Frozen100,
    Snowball,
    Rolling,
    Dead,
}

impl EnemyState {
    pub fn is_frozen_tier(self) -> bool {
        matches!(
            self,
            EnemyState::Frozen25 | EnemyState::Frozen50 | EnemyState::Frozen75 | EnemyState::Frozen100
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub state: EnemyState,
    /// 0..=100
    pub freeze_level: u32,
    pub freeze_decay_timer: u32,
    pub ai_timer: u32,
    /// On-ground ticks spent rolling
    pub roll_timer: u32,
}

/// Thrown snow projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowAttack {
    pub id: u32,
    /// Id of the firing player
    pub owner: u32,
    pub body: Body,
    pub lifetime: u32,
    /// Freeze added on hit (25 normal, 50 under power boost)
    pub power: u32,
    /// Pierces through enemies instead of being consumed
    pub enhanced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    PotionRed,
    PotionBlue,
    PotionYellow,
    Sushi,
    MoneyBag,
    ExtraLife,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub body: Body,
    pub lifetime: u32,
}

/// Six independent buttons sampled for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub attack: bool,
}

/// Partial input update; `None` fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPatch {
    #[serde(default)]
    pub left: Option<bool>,
    #[serde(default)]
    pub right: Option<bool>,
    #[serde(default)]
    pub up: Option<bool>,
    #[serde(default)]
    pub down: Option<bool>,
    #[serde(default)]
    pub jump: Option<bool>,
    #[serde(default)]
    pub attack: Option<bool>,
}

impl InputState {
    pub fn merge(&mut self, patch: &InputPatch) {
        let fields = [
            (&mut self.left, patch.left),
            (&mut self.right, patch.right),
            (&mut self.up, patch.up),
            (&mut self.down, patch.down),
            (&mut self.jump, patch.jump),
            (&mut self.attack, patch.attack),
        ];
        for (slot, value) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

impl From<InputState> for InputPatch {
    fn from(input: InputState) -> Self {
        Self {
            left: Some(input.left),
            right: Some(input.right),
            up: Some(input.up),
            down: Some(input.down),
            jump: Some(input.jump),
            attack: Some(input.attack),
        }
    }
}

/// Things that happened during a tick, for audio/UI collaborators.
/// Transient: never part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    EnemyFrozen { enemy: u32 },
    SnowballPushed { enemy: u32, player: u32 },
    EnemyKilled { enemy: u32, score: u64, combo: u32 },
    PlayerDied { player: u32, lives_left: u32 },
    PlayerRespawned { player: u32 },
    ExtraLife { player: u32 },
    PowerUpCollected { player: u32, kind: PowerUpKind },
    Victory,
    GameOver,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    /// 1-based level number
    pub current_level: u32,
    /// Sorted by id
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub attacks: Vec<SnowAttack>,
    pub power_ups: Vec<PowerUp>,
    /// Level timer in ticks
    pub time_remaining: u32,
    pub combo: u32,
    pub combo_timer: u32,
    /// Ticks since the enemy list became empty
    pub level_complete_timer: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub rng: Pcg32,
    next_id: u32,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

/// Level timer: two minutes
pub const LEVEL_TIME_TICKS: u32 = 120 * 60;
/// Timer refill once the level timer runs out
pub const OVERTIME_TICKS: u32 = 60 * 60;
/// Undrained events kept; the oldest go first
pub const MAX_PENDING_EVENTS: usize = 256;

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    /// Fresh state in the menu, RNG seeded for the session
    pub fn new(seed: u64) -> Self {
        Self {
            status: GameStatus::Menu,
            current_level: 1,
            players: Vec::new(),
            enemies: Vec::new(),
            attacks: Vec::new(),
            power_ups: Vec::new(),
            time_remaining: LEVEL_TIME_TICKS,
            combo: 0,
            combo_timer: 0,
            level_complete_timer: 0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.id);
        self.enemies.sort_by_key(|e| e.id);
        self.attacks.sort_by_key(|a| a.id);
        self.power_ups.sort_by_key(|p| p.id);
    }

    /// Index of the first player that is not dead (stray-kill recipient)
    pub fn first_living_player(&self) -> Option<usize> {
        self.players.iter().position(|p| p.state != PlayerState::Dead)
    }

    pub fn player_by_id(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_by_number(&self, number: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.number == number)
    }

    /// True when every player is dead with no lives left
    pub fn all_players_out(&self) -> bool {
        !self.players.is_empty()
            && self
                .players
                .iter()
                .all(|p| p.state == PlayerState::Dead && p.lives == 0)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            let excess = self.events.len() + 1 - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }
        self.events.push(event);
    }

    /// Where a drop appears for a body, `lift` pixels above its corner
    pub fn drop_point(body: &Body, lift: f32) -> Vec2 {
        Vec2::new(body.pos.x, body.pos.y - lift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_patch_merges_only_given_fields() {
        let mut input = InputState {
            left: true,
            jump: true,
            ..Default::default()
        };
        input.merge(&InputPatch {
            left: Some(false),
            attack: Some(true),
            ..Default::default()
        });
        assert!(!input.left);
        assert!(input.jump);
        assert!(input.attack);
        assert!(!input.right);
    }

    #[test]
    fn test_pending_events_keep_the_newest() {
        let mut state = GameState::new(7);
        let total = MAX_PENDING_EVENTS as u32 + 40;
        for level in 0..total {
            state.push_event(GameEvent::LevelStarted { level });
        }
        assert_eq!(state.events.len(), MAX_PENDING_EVENTS);
        assert_eq!(state.events.first(), Some(&GameEvent::LevelStarted { level: 40 }));
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::LevelStarted { level: total - 1 })
        );
    }

    #[test]
    fn test_entity_ids_are_monotone() {
        let mut state = GameState::new(7);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_all_players_out_requires_players() {
        let state = GameState::new(1);
        assert!(!state.all_players_out());
    }
}
