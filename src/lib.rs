//! Snowpush - deterministic core of a freeze-and-push co-op platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, entities, levels, engine)
//! - `driver`: Fixed-timestep accumulator and host/guest replication role
//! - `persistence`: Versioned snapshot envelope with validation
//! - `settings`: Runtime configuration

pub mod driver;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use driver::{FixedStepDriver, Role};
pub use settings::Settings;
pub use sim::Engine;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions
    pub const GAME_WIDTH: f32 = 256.0;
    pub const GAME_HEIGHT: f32 = 224.0;
    /// Strip reserved for the HUD at the bottom of the screen
    pub const UI_BOTTOM: f32 = 20.0;
    /// Lowest walkable line; anything below it is out of play
    pub const GROUND_Y: f32 = GAME_HEIGHT - UI_BOTTOM;

    /// Gravity (pixels/tick²) and terminal fall speed (pixels/tick)
    pub const GRAVITY: f32 = 0.3;
    pub const MAX_FALL_SPEED: f32 = 5.0;

    /// Player movement
    pub const PLAYER_SPEED: f32 = 1.5;
    pub const PLAYER_JUMP_FORCE: f32 = -5.5;
    pub const PLAYER_START_LIVES: u32 = 3;

    /// Live entity caps (gameplay rates keep counts far below these)
    pub const MAX_ENEMIES: usize = 64;
    pub const MAX_ATTACKS: usize = 128;
    pub const MAX_POWERUPS: usize = 64;
}
