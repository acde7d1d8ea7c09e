//! Fixed-timestep driver and replication role
//!
//! Turns variable wall-clock frame deltas into whole simulation ticks. A host
//! publishes a snapshot after every frame that advanced the game; a guest
//! never simulates and only applies what the host sends.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::SnapshotError;
use crate::settings::Settings;
use crate::sim::Engine;

/// Frame deltas above this are treated as a stall
const DEFAULT_MAX_FRAME_DELTA: f32 = 0.25;

/// Who owns the simulation in this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Single process, no replication
    #[default]
    Local,
    /// Authoritative simulation, publishes snapshots
    Host,
    /// Replica that mirrors host snapshots
    Guest,
}

impl Role {
    pub fn simulates(self) -> bool {
        !matches!(self, Role::Guest)
    }
}

#[derive(Debug)]
pub struct FixedStepDriver {
    role: Role,
    accumulator: f32,
    max_substeps: u32,
    max_frame_delta: f32,
    outbox: Option<String>,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new(Role::Local)
    }
}

impl FixedStepDriver {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            outbox: None,
        }
    }

    pub fn from_settings(role: Role, settings: &Settings) -> Self {
        Self {
            max_substeps: settings.max_substeps.max(1),
            max_frame_delta: if settings.max_frame_delta_secs > 0.0 {
                settings.max_frame_delta_secs
            } else {
                DEFAULT_MAX_FRAME_DELTA
            },
            ..Self::new(role)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Run as many whole ticks as `dt_secs` of wall time allows. Returns
    /// the number of ticks run.
    pub fn advance(&mut self, engine: &mut Engine, dt_secs: f32) -> u32 {
        if !self.role.simulates() {
            return 0;
        }

        let dt = if dt_secs.is_finite() {
            dt_secs.clamp(0.0, self.max_frame_delta)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < self.max_substeps {
            engine.update(1);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Behind by more than a frame's budget: drop the backlog
        if self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        if self.role == Role::Host && substeps > 0 {
            match engine.serialize() {
                Ok(snapshot) => self.outbox = Some(snapshot),
                Err(e) => log::warn!("Failed to serialize snapshot: {e}"),
            }
        }

        substeps
    }

    /// Latest host snapshot not yet handed out
    pub fn take_snapshot(&mut self) -> Option<String> {
        self.outbox.take()
    }

    /// Replace the engine state with a received snapshot
    pub fn apply_snapshot(&self, engine: &mut Engine, text: &str) -> Result<(), SnapshotError> {
        if self.role != Role::Guest {
            log::debug!("{:?} applying a snapshot", self.role);
        }
        engine.deserialize(text)
    }
}
