//! Player behavior: movement, jumping, attack window, death and respawn

use glam::Vec2;

use super::level::Platform;
use super::physics::{Body, resolve_platforms};
use super::state::{InputState, Player, PlayerState};
use crate::consts::*;

pub const PLAYER_SIZE: Vec2 = Vec2::new(14.0, 16.0);
pub const ATTACK_COOLDOWN_TICKS: u32 = 15;
/// Length of the attack pose (200 ms)
pub const ATTACK_WINDOW_TICKS: u32 = 12;
pub const RESPAWN_DELAY_TICKS: u32 = 120;
pub const RESPAWN_INVINCIBLE_TICKS: u32 = 180;
pub const LEVEL_ENTRY_INVINCIBLE_TICKS: u32 = 120;
/// One extra life per this many points
pub const EXTRA_LIFE_EVERY: u64 = 10_000;

const DEATH_HOP_SPEED: f32 = -3.0;
/// A dead player stops drifting once it is this far down
const DEATH_REST_Y: f32 = GAME_HEIGHT + 32.0;

impl Player {
    pub fn new(id: u32, number: u8, spawn: Vec2) -> Self {
        let mut body = Body::new(spawn, PLAYER_SIZE);
        body.facing_right = number == 1;
        Self {
            id,
            number,
            body,
            state: PlayerState::Idle,
            lives: PLAYER_START_LIVES,
            score: 0,
            is_attacking: false,
            attack_timer: 0,
            attack_cooldown: 0,
            invincible: false,
            invincible_timer: 0,
            on_ground: false,
            speed_boost_timer: 0,
            power_boost_timer: 0,
            respawn_timer: 0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    /// Whether attack input would start an attack right now
    pub fn can_attack(&self) -> bool {
        !self.is_dead() && self.attack_cooldown == 0 && !self.is_attacking
    }

    #[inline]
    pub fn has_speed_boost(&self) -> bool {
        self.speed_boost_timer > 0
    }

    #[inline]
    pub fn has_power_boost(&self) -> bool {
        self.power_boost_timer > 0
    }

    /// Advance one tick
    pub fn update(&mut self, input: &InputState, platforms: &[Platform]) {
        // Sampled before timers move so the engine and the player agree on
        // whether this tick's attack input fires
        let starts_attack = input.attack && self.can_attack();

        self.tick_timers();

        if self.is_dead() {
            self.update_dead();
            return;
        }

        let previous_y = self.body.pos.y;

        let horizontal_state = if self.is_attacking {
            PlayerState::Attacking
        } else {
            PlayerState::Walking
        };
        if input.left && !input.right {
            self.body.vel.x = -PLAYER_SPEED;
            self.body.facing_right = false;
            if self.on_ground {
                self.state = horizontal_state;
            }
        } else if input.right && !input.left {
            self.body.vel.x = PLAYER_SPEED;
            self.body.facing_right = true;
            if self.on_ground {
                self.state = horizontal_state;
            }
        } else {
            self.body.vel.x = 0.0;
            if self.on_ground && !self.is_attacking {
                self.state = PlayerState::Idle;
            }
        }

        if input.jump && self.on_ground {
            self.body.vel.y = PLAYER_JUMP_FORCE;
            self.on_ground = false;
            self.state = PlayerState::Jumping;
        }

        if starts_attack {
            self.is_attacking = true;
            self.attack_cooldown = ATTACK_COOLDOWN_TICKS;
            self.attack_timer = ATTACK_WINDOW_TICKS;
            self.state = PlayerState::Attacking;
        }

        self.body.apply_gravity();
        self.body.integrate();
        self.on_ground = resolve_platforms(&mut self.body, platforms, previous_y);

        if !self.on_ground && !self.is_attacking {
            self.state = if self.body.vel.y < 0.0 {
                PlayerState::Jumping
            } else {
                PlayerState::Falling
            };
        }

        self.body.wrap_around_screen();

        if self.body.pos.y > GROUND_Y {
            self.die();
        }
    }

    fn tick_timers(&mut self) {
        if self.invincible {
            self.invincible_timer = self.invincible_timer.saturating_sub(1);
            if self.invincible_timer == 0 {
                self.invincible = false;
            }
        }
        self.speed_boost_timer = self.speed_boost_timer.saturating_sub(1);
        self.power_boost_timer = self.power_boost_timer.saturating_sub(1);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);

        if self.is_attacking {
            self.attack_timer = self.attack_timer.saturating_sub(1);
            if self.attack_timer == 0 {
                self.is_attacking = false;
                if self.state == PlayerState::Attacking {
                    self.state = if self.on_ground {
                        PlayerState::Idle
                    } else {
                        PlayerState::Falling
                    };
                }
            }
        }
    }

    /// Death flop: gravity only, no input
    fn update_dead(&mut self) {
        if self.body.pos.y >= DEATH_REST_Y {
            self.body.vel = Vec2::ZERO;
            return;
        }
        self.body.apply_gravity();
        self.body.integrate();
    }

    /// Lose a life and start the death flop
    pub fn die(&mut self) {
        self.state = PlayerState::Dead;
        self.lives = self.lives.saturating_sub(1);
        self.body.vel = Vec2::new(0.0, DEATH_HOP_SPEED);
        self.is_attacking = false;
        self.attack_timer = 0;
        self.on_ground = false;
        self.respawn_timer = 0;
    }

    /// Back into play at `spawn` with temporary invincibility
    pub fn respawn(&mut self, spawn: Vec2) {
        self.place_at(spawn);
        self.grant_invincibility(RESPAWN_INVINCIBLE_TICKS);
        self.respawn_timer = 0;
    }

    /// Reposition a surviving player at a new level's spawn point
    pub fn enter_level(&mut self, spawn: Vec2) {
        self.place_at(spawn);
        self.grant_invincibility(LEVEL_ENTRY_INVINCIBLE_TICKS);
    }

    fn place_at(&mut self, spawn: Vec2) {
        self.body.pos = spawn;
        self.body.vel = Vec2::ZERO;
        self.state = PlayerState::Idle;
        self.on_ground = false;
        self.is_attacking = false;
        self.attack_timer = 0;
    }

    pub fn grant_invincibility(&mut self, ticks: u32) {
        self.invincible = true;
        self.invincible_timer = ticks;
    }

    /// Add points, granting one life per 10 000-point boundary crossed.
    /// Returns the number of lives gained.
    pub fn add_score(&mut self, points: u64) -> u32 {
        let before = self.score / EXTRA_LIFE_EVERY;
        self.score = self.score.saturating_add(points);
        let gained = (self.score / EXTRA_LIFE_EVERY - before) as u32;
        self.lives += gained;
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Vec<Platform> {
        vec![Platform {
            x: 0.0,
            y: GROUND_Y - 8.0,
            width: GAME_WIDTH,
            height: 8.0,
            one_way: false,
        }]
    }

    /// Player standing on the floor after one settling tick
    fn grounded_player() -> Player {
        let mut player = Player::new(1, 1, Vec2::new(40.0, GROUND_Y - 8.0 - PLAYER_SIZE.y));
        player.update(&InputState::default(), &floor());
        assert!(player.on_ground);
        player
    }

    #[test]
    fn test_milestone_grants_one_life() {
        let mut player = Player::new(1, 1, Vec2::ZERO);
        player.score = 9_900;
        let lives = player.lives;
        assert_eq!(player.add_score(200), 1);
        assert_eq!(player.score, 10_100);
        assert_eq!(player.lives, lives + 1);
    }

    #[test]
    fn test_large_award_grants_several_lives() {
        let mut player = Player::new(1, 1, Vec2::ZERO);
        player.score = 9_000;
        assert_eq!(player.add_score(25_000), 3);
        assert_eq!(player.add_score(10), 0);
    }

    #[test]
    fn test_walk_and_idle() {
        let mut player = grounded_player();
        let right = InputState {
            right: true,
            ..Default::default()
        };
        player.update(&right, &floor());
        assert_eq!(player.state, PlayerState::Walking);
        assert!(player.body.facing_right);
        player.update(&InputState::default(), &floor());
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn test_jump_then_fall() {
        let mut player = grounded_player();
        let jump = InputState {
            jump: true,
            ..Default::default()
        };
        player.update(&jump, &floor());
        assert_eq!(player.state, PlayerState::Jumping);
        assert!(!player.on_ground);

        let mut saw_falling = false;
        for _ in 0..60 {
            player.update(&InputState::default(), &floor());
            if player.state == PlayerState::Falling {
                saw_falling = true;
                assert!(player.body.vel.y >= 0.0);
            }
        }
        assert!(saw_falling);
        assert!(player.on_ground);
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn test_attack_window_expires() {
        let mut player = grounded_player();
        let attack = InputState {
            attack: true,
            ..Default::default()
        };
        player.update(&attack, &floor());
        assert!(player.is_attacking);
        assert_eq!(player.state, PlayerState::Attacking);
        assert!(!player.can_attack());

        for _ in 0..ATTACK_WINDOW_TICKS {
            player.update(&InputState::default(), &floor());
        }
        assert!(!player.is_attacking);
        assert_eq!(player.state, PlayerState::Idle);
        // Cooldown outlasts the window
        assert!(player.attack_cooldown > 0);
    }

    #[test]
    fn test_falling_off_the_bottom_kills() {
        let mut player = Player::new(1, 1, Vec2::new(40.0, GROUND_Y - 1.0));
        player.body.vel.y = 4.0;
        player.update(&InputState::default(), &[]);
        assert!(player.is_dead());
        assert_eq!(player.lives, PLAYER_START_LIVES - 1);
    }

    #[test]
    fn test_dead_player_ignores_input() {
        let mut player = grounded_player();
        player.die();
        let x = player.body.pos.x;
        let input = InputState {
            left: true,
            jump: true,
            attack: true,
            ..Default::default()
        };
        player.update(&input, &floor());
        assert_eq!(player.body.pos.x, x);
        assert!(!player.is_attacking);
        assert!(player.is_dead());
    }

    #[test]
    fn test_invincibility_self_clears() {
        let mut player = grounded_player();
        player.grant_invincibility(3);
        for _ in 0..3 {
            assert!(player.invincible);
            player.update(&InputState::default(), &floor());
        }
        assert!(!player.invincible);
    }

    #[test]
    fn test_respawn_resets_motion() {
        let mut player = grounded_player();
        player.die();
        player.respawn(Vec2::new(10.0, 20.0));
        assert_eq!(player.state, PlayerState::Idle);
        assert_eq!(player.body.pos, Vec2::new(10.0, 20.0));
        assert_eq!(player.body.vel, Vec2::ZERO);
        assert!(player.invincible);
        assert_eq!(player.invincible_timer, RESPAWN_INVINCIBLE_TICKS);
    }
}
