//! Runtime settings
//!
//! Persisted as JSON next to the binary. Gameplay tuning is compile-time
//! (`crate::consts`); this only covers how a session is run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 1 or 2 players
    pub player_count: u8,
    /// Seed for the session RNG
    pub seed: u64,

    // === Fixed timestep ===
    /// Maximum ticks per frame
    pub max_substeps: u32,
    /// Longest frame delta the driver accepts (seconds)
    pub max_frame_delta_secs: f32,

    // === Diagnostics ===
    /// env_logger filter used when RUST_LOG is unset
    pub log_level: String,
    /// Run integrity checks on incoming snapshots
    pub validate_snapshots: bool,

    /// Ticks simulated by the headless runner
    pub demo_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_count: 1,
            seed: 0x5eed,

            max_substeps: MAX_SUBSTEPS,
            max_frame_delta_secs: 0.25,

            log_level: "info".to_string(),
            validate_snapshots: true,

            demo_ticks: 3600,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing file yields defaults; a malformed one is
    /// an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings: Self = serde_json::from_str(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Clamp values into the ranges the engine and driver accept
    pub fn sanitized(mut self) -> Self {
        self.player_count = self.player_count.clamp(1, 2);
        self.max_substeps = self.max_substeps.max(1);
        if !self.max_frame_delta_secs.is_finite() || self.max_frame_delta_secs <= 0.0 {
            self.max_frame_delta_secs = Self::default().max_frame_delta_secs;
        }
        self
    }
}
