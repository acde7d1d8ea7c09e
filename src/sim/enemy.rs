//! Enemy behavior: AI decisions, the freeze sub-machine, rolling snowballs
//! and the death flop.

use glam::Vec2;
use rand::Rng;

use super::level::Platform;
use super::physics::{Body, platform_below, resolve_platforms};
use super::state::{Enemy, EnemyKind, EnemyState, Player};
use crate::consts::*;

/// Per-kind tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTraits {
    pub size: Vec2,
    pub speed: f32,
    pub jump_force: f32,
    pub can_jump: bool,
    pub kill_score: u64,
}

impl EnemyKind {
    pub fn traits(self) -> EnemyTraits {
        match self {
            EnemyKind::Red => EnemyTraits {
                size: Vec2::new(14.0, 16.0),
                speed: 0.8,
                jump_force: -4.0,
                can_jump: false,
                kill_score: 500,
            },
            EnemyKind::Blue => EnemyTraits {
                size: Vec2::new(14.0, 16.0),
                speed: 1.0,
                jump_force: -5.0,
                can_jump: true,
                kill_score: 800,
            },
            EnemyKind::Green => EnemyTraits {
                size: Vec2::new(14.0, 16.0),
                speed: 0.7,
                jump_force: -4.0,
                can_jump: false,
                kill_score: 1000,
            },
            EnemyKind::Boss => EnemyTraits {
                size: Vec2::new(32.0, 32.0),
                speed: 0.5,
                jump_force: -6.0,
                can_jump: true,
                kill_score: 5000,
            },
        }
    }

    /// Ticks between AI decisions
    fn ai_interval(self) -> u32 {
        match self {
            EnemyKind::Boss => 20,
            _ => 30,
        }
    }

    /// Ticks between freeze decay steps, and the amount thawed per step
    fn thaw(self) -> (u32, u32) {
        match self {
            EnemyKind::Boss => (30, 5),
            _ => (60, 2),
        }
    }
}

pub const FREEZE_MAX: u32 = 100;
/// Contact with an enemy at or above this freeze level is harmless
pub const FREEZE_HARMLESS: u32 = 50;
pub const ROLL_SPEED: f32 = 4.0;
/// On-ground ticks a snowball may roll before breaking up (5 s)
pub const ROLL_TIME_LIMIT: u32 = 300;

const DEATH_HOP_SPEED: f32 = -3.0;
const DEATH_FLOP_GRAVITY: f32 = 0.2;
/// Dead enemies are evicted once this far below the floor line
const DEATH_EVICT_DEPTH: f32 = 50.0;
const BOSS_SPEED_MULTIPLIER: f32 = 1.5;
const BOSS_JUMP_MULTIPLIER: f32 = 1.2;

/// Horizontal speed multiplier for a freeze level
pub fn freeze_speed_factor(freeze_level: u32) -> f32 {
    match freeze_level {
        75.. => 0.0,
        50.. => 0.3,
        25.. => 0.6,
        _ => 1.0,
    }
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, rng: &mut impl Rng) -> Self {
        let traits = kind.traits();
        let mut body = Body::new(pos, traits.size);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        body.vel.x = direction * traits.speed;
        body.facing_right = rng.random_bool(0.5);
        Self {
            id,
            kind,
            body,
            state: EnemyState::Idle,
            freeze_level: 0,
            freeze_decay_timer: 0,
            ai_timer: rng.random_range(0..60),
            roll_timer: 0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    #[inline]
    pub fn is_rolling(&self) -> bool {
        self.state == EnemyState::Rolling
    }

    #[inline]
    pub fn is_snowball(&self) -> bool {
        self.state == EnemyState::Snowball
    }

    /// Snow attacks only land on enemies that are still moving under AI
    pub fn can_be_frozen(&self) -> bool {
        !matches!(
            self.state,
            EnemyState::Dead | EnemyState::Rolling | EnemyState::Snowball
        )
    }

    /// Touching this enemy kills a vulnerable player
    pub fn is_lethal(&self) -> bool {
        self.can_be_frozen() && self.freeze_level < FREEZE_HARMLESS
    }

    /// Standard update for idle/walking/jumping/falling/frozen enemies
    pub fn update(&mut self, platforms: &[Platform], players: &[Player], rng: &mut impl Rng) {
        match self.state {
            EnemyState::Dead | EnemyState::Rolling => return,
            EnemyState::Snowball => {
                self.settle(platforms);
                return;
            }
            _ => {}
        }

        let previous_y = self.body.pos.y;

        if self.freeze_level > 0 {
            let (interval, step) = self.kind.thaw();
            self.freeze_decay_timer += 1;
            if self.freeze_decay_timer >= interval {
                self.freeze_decay_timer = 0;
                self.freeze_level = self.freeze_level.saturating_sub(step);
            }
        }

        self.ai_timer += 1;
        let target = nearest_player(&self.body, players).map(|p| p.body.pos);
        match self.kind {
            EnemyKind::Boss => self.boss_ai(target, rng),
            _ => self.basic_ai(target, platforms, rng),
        }

        let factor = freeze_speed_factor(self.freeze_level);
        if factor < 1.0 {
            let cap = self.kind.traits().speed * factor;
            self.body.vel.x = self.body.vel.x.clamp(-cap, cap);
        }

        self.body.apply_gravity();
        self.body.integrate();
        let on_ground = resolve_platforms(&mut self.body, platforms, previous_y);
        self.settle_state(on_ground);

        self.body.wrap_around_screen();
        self.clamp_to_floor();
    }

    fn basic_ai(&mut self, target: Option<Vec2>, platforms: &[Platform], rng: &mut impl Rng) {
        if self.ai_timer < self.kind.ai_interval() {
            return;
        }
        self.ai_timer = 0;

        let traits = self.kind.traits();
        let grounded = self.body.vel.y == 0.0;

        match target {
            Some(target) if rng.random::<f32>() > 0.3 => {
                self.face(target.x >= self.body.pos.x, traits.speed);

                let player_above = target.y < self.body.pos.y - 20.0;
                if traits.can_jump && player_above && rng.random::<f32>() > 0.5 {
                    let has_takeoff = platform_below(&self.body, platforms).is_some()
                        || self.body.pos.y >= GROUND_Y - 20.0;
                    if has_takeoff && grounded {
                        self.jump(traits.jump_force);
                    }
                }
            }
            _ => {
                let roll = rng.random::<f32>();
                if roll < 0.3 {
                    self.face(false, traits.speed);
                } else if roll < 0.6 {
                    self.face(true, traits.speed);
                } else if roll < 0.8 && traits.can_jump && grounded {
                    self.jump(traits.jump_force);
                }
            }
        }
    }

    /// Faster tracking, shorter reaction window, jump attacks at close range
    fn boss_ai(&mut self, target: Option<Vec2>, rng: &mut impl Rng) {
        if self.ai_timer < self.kind.ai_interval() {
            return;
        }
        self.ai_timer = 0;

        let traits = self.kind.traits();
        let Some(target) = target else {
            self.face(rng.random_bool(0.5), traits.speed);
            return;
        };

        let dist_x = (target.x - self.body.pos.x).abs();
        let dist_y = target.y - self.body.pos.y;
        let chase_speed = traits.speed * BOSS_SPEED_MULTIPLIER;

        if target.x < self.body.pos.x - 10.0 {
            self.face(false, chase_speed);
        } else if target.x > self.body.pos.x + 10.0 {
            self.face(true, chase_speed);
        } else {
            self.body.vel.x = 0.0;
        }

        let should_jump = (dist_y < -30.0 && rng.random::<f32>() > 0.3)
            || (dist_x < 50.0 && dist_y > -20.0 && rng.random::<f32>() > 0.6);
        if should_jump && self.body.vel.y == 0.0 {
            self.jump(traits.jump_force * BOSS_JUMP_MULTIPLIER);
        }
    }

    fn face(&mut self, right: bool, speed: f32) {
        self.body.facing_right = right;
        self.body.vel.x = if right { speed } else { -speed };
    }

    fn jump(&mut self, force: f32) {
        self.body.vel.y = force;
        self.state = EnemyState::Jumping;
    }

    fn settle_state(&mut self, on_ground: bool) {
        if self.freeze_level > 0 {
            self.refresh_freeze_state();
        } else if on_ground {
            self.state = if self.body.vel.x != 0.0 {
                EnemyState::Walking
            } else {
                EnemyState::Idle
            };
        } else if self.body.vel.y >= 0.0 {
            self.state = EnemyState::Falling;
        } else {
            self.state = EnemyState::Jumping;
        }
    }

    /// Snowballs still fall and land, nothing else
    fn settle(&mut self, platforms: &[Platform]) {
        let previous_y = self.body.pos.y;
        self.body.apply_gravity();
        self.body.integrate();
        resolve_platforms(&mut self.body, platforms, previous_y);
        self.clamp_to_floor();
    }

    fn clamp_to_floor(&mut self) {
        if self.body.pos.y > GROUND_Y - self.body.size.y {
            self.body.pos.y = GROUND_Y - self.body.size.y;
            self.body.vel.y = 0.0;
        }
    }

    /// Add freeze from a hit. Returns true if the enemy just became a snowball.
    pub fn freeze(&mut self, amount: u32) -> bool {
        if !self.can_be_frozen() {
            return false;
        }
        self.freeze_level = (self.freeze_level + amount).min(FREEZE_MAX);
        self.freeze_decay_timer = 0;
        self.refresh_freeze_state();
        self.is_snowball()
    }

    fn refresh_freeze_state(&mut self) {
        self.state = match self.freeze_level {
            FREEZE_MAX.. => {
                self.body.vel.x = 0.0;
                EnemyState::Snowball
            }
            75.. => EnemyState::Frozen100,
            50.. => EnemyState::Frozen75,
            25.. => EnemyState::Frozen50,
            1.. => EnemyState::Frozen25,
            0 if self.state.is_frozen_tier() => EnemyState::Idle,
            0 => self.state,
        };
    }

    /// Kick a snowball into motion; `direction` is +1 (right) or -1 (left)
    pub fn push(&mut self, direction: f32) -> bool {
        if !self.is_snowball() {
            return false;
        }
        self.state = EnemyState::Rolling;
        self.body.vel.x = direction.signum() * ROLL_SPEED;
        self.body.facing_right = direction > 0.0;
        self.roll_timer = 0;
        true
    }

    /// Rolling physics. Returns true when the snowball breaks up (state = dead).
    pub fn update_rolling(&mut self, platforms: &[Platform]) -> bool {
        if !self.is_rolling() {
            return false;
        }

        let previous_y = self.body.pos.y;
        self.body.apply_gravity();
        self.body.integrate();
        let on_ground = resolve_platforms(&mut self.body, platforms, previous_y);

        let w = self.body.size.x;
        let out_sideways = self.body.pos.x < -w * 2.0 || self.body.pos.x > GAME_WIDTH + w;
        let out_bottom = self.body.pos.y > GROUND_Y;
        if on_ground {
            self.roll_timer += 1;
        }
        if out_sideways || out_bottom || self.roll_timer > ROLL_TIME_LIMIT {
            self.state = EnemyState::Dead;
            return true;
        }
        false
    }

    /// Mark dead and start the death flop. Returns the base kill score.
    pub fn kill(&mut self) -> u64 {
        self.state = EnemyState::Dead;
        self.body.vel.y = DEATH_HOP_SPEED;
        self.kind.traits().kill_score
    }

    /// Death flop. Returns true once the enemy is far enough below the field
    /// to be evicted.
    pub fn update_dead(&mut self) -> bool {
        self.body.pos += self.body.vel;
        self.body.vel.y += DEATH_FLOP_GRAVITY;
        self.body.pos.y > GROUND_Y + DEATH_EVICT_DEPTH
    }
}

/// Closest living player with lives left, by Manhattan distance
pub fn nearest_player<'a>(body: &Body, players: &'a [Player]) -> Option<&'a Player> {
    players
        .iter()
        .filter(|p| !p.is_dead() && p.lives > 0)
        .map(|p| {
            let d = p.body.pos - body.pos;
            (p, d.x.abs() + d.y.abs())
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(p, _)| p)
}
