//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, carried inside `GameState`
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod attack;
pub mod enemy;
pub mod engine;
pub mod level;
pub mod physics;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use engine::Engine;
pub use level::{EnemySpawn, Level, LevelCatalog, Platform};
pub use physics::Body;
pub use state::{
    Enemy, EnemyKind, EnemyState, GameEvent, GameState, GameStatus, InputPatch, InputState, Player,
    PlayerState, PowerUp, PowerUpKind, SnowAttack,
};
pub use tick::{TickOutcome, tick};
