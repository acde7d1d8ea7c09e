//! Snow projectiles

use glam::Vec2;

use super::physics::Body;
use super::state::{Enemy, Player, SnowAttack};
use crate::consts::*;

pub const NORMAL_POWER: u32 = 25;
pub const BOOSTED_POWER: u32 = 50;
const SNOW_GRAVITY: f32 = 0.12;
const LAUNCH_LIFT: f32 = -1.5;
/// Slack past the side edges before a projectile is discarded
const SIDE_MARGIN: f32 = 20.0;

impl SnowAttack {
    /// Throw from the front edge of `player`, shaped by its active buffs
    pub fn fire(id: u32, player: &Player) -> Self {
        let enhanced = player.has_speed_boost();
        let (size, speed, lifetime) = if enhanced {
            (Vec2::new(16.0, 10.0), 4.5, 60)
        } else {
            (Vec2::new(8.0, 8.0), 3.5, 45)
        };
        let power = if player.has_power_boost() {
            BOOSTED_POWER
        } else {
            NORMAL_POWER
        };

        let facing_right = player.body.facing_right;
        let x = if facing_right {
            player.body.right()
        } else {
            player.body.left() - size.x
        };
        let direction = if facing_right { 1.0 } else { -1.0 };

        let mut body = Body::new(Vec2::new(x, player.body.pos.y + 2.0), size);
        body.vel = Vec2::new(direction * speed, LAUNCH_LIFT);
        body.facing_right = facing_right;

        Self {
            id,
            owner: player.id,
            body,
            lifetime,
            power,
            enhanced,
        }
    }

    /// Advance one tick. Returns true when the projectile has expired.
    pub fn update(&mut self) -> bool {
        self.body.vel.y += SNOW_GRAVITY;
        self.body.integrate();
        self.lifetime = self.lifetime.saturating_sub(1);

        self.lifetime == 0
            || self.body.pos.x < -SIDE_MARGIN
            || self.body.pos.x > GAME_WIDTH + SIDE_MARGIN
            || self.body.pos.y > GAME_HEIGHT
    }

    /// Freeze every eligible enemy this projectile touches. A normal shot
    /// stops at its first hit; an enhanced one keeps going. Returns the ids of
    /// enemies that became snowballs and whether the shot was consumed.
    pub fn strike(&self, enemies: &mut [Enemy]) -> (Vec<u32>, bool) {
        let mut frozen = Vec::new();
        for enemy in enemies.iter_mut() {
            if !enemy.can_be_frozen() || !self.body.collides(&enemy.body) {
                continue;
            }
            if enemy.freeze(self.power) {
                frozen.push(enemy.id);
            }
            if !self.enhanced {
                return (frozen, true);
            }
        }
        (frozen, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EnemyKind, EnemyState};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn shooter() -> Player {
        Player::new(1, 1, Vec2::new(100.0, 100.0))
    }

    fn enemy_at(id: u32, x: f32) -> Enemy {
        let mut rng = Pcg32::seed_from_u64(id as u64);
        Enemy::new(id, EnemyKind::Red, Vec2::new(x, 100.0), &mut rng)
    }

    #[test]
    fn test_fire_in_facing_direction() {
        let mut player = shooter();
        let shot = SnowAttack::fire(10, &player);
        assert_eq!(shot.body.pos.x, player.body.right());
        assert!(shot.body.vel.x > 0.0);
        assert_eq!(shot.power, NORMAL_POWER);
        assert!(!shot.enhanced);

        player.body.facing_right = false;
        let shot = SnowAttack::fire(11, &player);
        assert_eq!(shot.body.right(), player.body.left());
        assert!(shot.body.vel.x < 0.0);
    }

    #[test]
    fn test_buffs_shape_the_shot() {
        let mut player = shooter();
        player.speed_boost_timer = 10;
        player.power_boost_timer = 10;
        let shot = SnowAttack::fire(1, &player);
        assert!(shot.enhanced);
        assert_eq!(shot.power, BOOSTED_POWER);
        assert_eq!(shot.lifetime, 60);
        assert_eq!(shot.body.size, Vec2::new(16.0, 10.0));
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut shot = SnowAttack::fire(1, &shooter());
        let mut ticks = 1;
        while !shot.update() {
            ticks += 1;
        }
        assert_eq!(ticks, 45);
    }

    #[test]
    fn test_normal_shot_stops_at_first_hit() {
        let shot = SnowAttack::fire(1, &shooter());
        let x = shot.body.pos.x;
        let mut enemies = vec![enemy_at(2, x), enemy_at(3, x + 2.0)];
        let (_, consumed) = shot.strike(&mut enemies);
        assert!(consumed);
        assert_eq!(enemies[0].freeze_level, NORMAL_POWER);
        assert_eq!(enemies[1].freeze_level, 0);
    }

    #[test]
    fn test_enhanced_shot_pierces() {
        let mut player = shooter();
        player.speed_boost_timer = 10;
        let shot = SnowAttack::fire(1, &player);
        let x = shot.body.pos.x;
        let mut enemies = vec![enemy_at(2, x), enemy_at(3, x + 2.0)];
        let (_, consumed) = shot.strike(&mut enemies);
        assert!(!consumed);
        assert_eq!(enemies[0].freeze_level, NORMAL_POWER);
        assert_eq!(enemies[1].freeze_level, NORMAL_POWER);
    }

    #[test]
    fn test_snowballs_are_not_hit() {
        let shot = SnowAttack::fire(1, &shooter());
        let mut snowball = enemy_at(2, shot.body.pos.x);
        snowball.freeze(100);
        let mut enemies = vec![snowball];
        let (frozen, consumed) = shot.strike(&mut enemies);
        assert!(frozen.is_empty());
        assert!(!consumed);
        assert_eq!(enemies[0].state, EnemyState::Snowball);
    }
}
