//! Dropped power-ups: drift, expiry, pickup effects and the drop table

use glam::Vec2;
use rand::Rng;

use super::physics::Body;
use super::state::{Player, PowerUp, PowerUpKind};
use crate::consts::*;

pub const POWERUP_LIFETIME: u32 = 600;
/// Renderers flash the item during its last two seconds
pub const FLASH_THRESHOLD: u32 = 120;
pub const BUFF_TICKS: u32 = 600;
pub const STAR_INVINCIBLE_TICKS: u32 = 480;

const DRIFT_DAMPING: f32 = 0.98;
const POP_SPEED: f32 = -3.0;
/// Items rest this far above the floor line
const REST_OFFSET: f32 = 8.0;

/// Drop weights, in `PowerUpKind::ALL` order
const DROP_WEIGHTS: [u32; 6] = [25, 25, 20, 15, 10, 5];

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::PotionRed,
        PowerUpKind::PotionBlue,
        PowerUpKind::PotionYellow,
        PowerUpKind::Sushi,
        PowerUpKind::MoneyBag,
        PowerUpKind::ExtraLife,
    ];

    pub fn size(self) -> Vec2 {
        match self {
            PowerUpKind::PotionRed | PowerUpKind::PotionBlue | PowerUpKind::PotionYellow => {
                Vec2::new(12.0, 12.0)
            }
            PowerUpKind::Sushi => Vec2::new(14.0, 10.0),
            PowerUpKind::MoneyBag => Vec2::new(12.0, 14.0),
            PowerUpKind::ExtraLife => Vec2::new(14.0, 14.0),
        }
    }

    pub fn score(self) -> u64 {
        match self {
            PowerUpKind::PotionRed | PowerUpKind::PotionBlue | PowerUpKind::PotionYellow => 200,
            PowerUpKind::Sushi | PowerUpKind::ExtraLife => 1000,
            PowerUpKind::MoneyBag => 5000,
        }
    }

    /// Weighted pick favoring potions over high-value rewards
    pub fn roll(rng: &mut impl Rng) -> Self {
        let total: u32 = DROP_WEIGHTS.iter().sum();
        let mut pick = rng.random_range(0..total);
        for (kind, weight) in Self::ALL.into_iter().zip(DROP_WEIGHTS) {
            if pick < weight {
                return kind;
            }
            pick -= weight;
        }
        PowerUpKind::Sushi
    }
}

impl PowerUp {
    pub fn spawn(id: u32, kind: PowerUpKind, pos: Vec2, rng: &mut impl Rng) -> Self {
        let mut body = Body::new(pos, kind.size());
        body.vel = Vec2::new(rng.random_range(-1.0..1.0), POP_SPEED);
        Self {
            id,
            kind,
            body,
            lifetime: POWERUP_LIFETIME,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.lifetime <= FLASH_THRESHOLD
    }

    /// Advance one tick. Returns true when the item has expired.
    pub fn update(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            return true;
        }

        self.body.apply_gravity();
        self.body.vel.x *= DRIFT_DAMPING;
        self.body.integrate();
        self.body.wrap_around_screen();

        let rest_y = GROUND_Y - self.body.size.y - REST_OFFSET;
        if self.body.pos.y > rest_y {
            self.body.pos.y = rest_y;
            self.body.vel.y = 0.0;
        }
        false
    }

    /// Grant this item's effect to `player`. Returns the score to award.
    pub fn apply(&self, player: &mut Player) -> u64 {
        match self.kind {
            PowerUpKind::PotionRed => player.speed_boost_timer = BUFF_TICKS,
            PowerUpKind::PotionBlue => player.power_boost_timer = BUFF_TICKS,
            PowerUpKind::PotionYellow => player.grant_invincibility(STAR_INVINCIBLE_TICKS),
            PowerUpKind::ExtraLife => player.lives += 1,
            PowerUpKind::Sushi | PowerUpKind::MoneyBag => {}
        }
        self.kind.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_drop_table_covers_every_kind() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut counts = [0u32; 6];
        for _ in 0..10_000 {
            let kind = PowerUpKind::roll(&mut rng);
            let index = PowerUpKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
            counts[index] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
        // Potions dominate, extra lives are rare
        assert!(counts[0] > counts[5] * 3);
        assert!(counts[1] > counts[4]);
    }

    #[test]
    fn test_rests_above_floor_and_expires() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut item = PowerUp::spawn(1, PowerUpKind::Sushi, Vec2::new(100.0, 150.0), &mut rng);
        let mut ticks = 1;
        while !item.update() {
            ticks += 1;
            assert!(item.body.bottom() <= GROUND_Y - REST_OFFSET + 0.001);
        }
        assert_eq!(ticks, POWERUP_LIFETIME);
    }

    #[test]
    fn test_flashing_near_expiry() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut item = PowerUp::spawn(1, PowerUpKind::Sushi, Vec2::new(100.0, 150.0), &mut rng);
        assert!(!item.is_flashing());
        item.lifetime = FLASH_THRESHOLD;
        assert!(item.is_flashing());
    }

    #[test]
    fn test_effects() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Player::new(1, 1, Vec2::ZERO);
        let lives = player.lives;

        let red = PowerUp::spawn(1, PowerUpKind::PotionRed, Vec2::ZERO, &mut rng);
        assert_eq!(red.apply(&mut player), 200);
        assert_eq!(player.speed_boost_timer, BUFF_TICKS);

        let blue = PowerUp::spawn(2, PowerUpKind::PotionBlue, Vec2::ZERO, &mut rng);
        blue.apply(&mut player);
        assert_eq!(player.power_boost_timer, BUFF_TICKS);

        let yellow = PowerUp::spawn(3, PowerUpKind::PotionYellow, Vec2::ZERO, &mut rng);
        yellow.apply(&mut player);
        assert!(player.invincible);

        let life = PowerUp::spawn(4, PowerUpKind::ExtraLife, Vec2::ZERO, &mut rng);
        assert_eq!(life.apply(&mut player), 1000);
        assert_eq!(player.lives, lives + 1);

        let bag = PowerUp::spawn(5, PowerUpKind::MoneyBag, Vec2::ZERO, &mut rng);
        assert_eq!(bag.apply(&mut player), 5000);
        assert_eq!(player.lives, lives + 1);
    }
}
