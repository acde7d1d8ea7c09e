//! Versioned JSON envelope

use serde::{Deserialize, Serialize};

use super::{SnapshotError, validate};
use crate::sim::{GameState, Level};

/// Bump whenever the serialized shape of `GameState` changes
pub const SNAPSHOT_VERSION: u32 = 1;

/// A decoded snapshot, ready to replace engine state wholesale
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub game_state: GameState,
    pub current_level: Option<Level>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    game_state: &'a GameState,
    current_level: Option<&'a Level>,
}

/// Only the version, so old or foreign payloads are reported as such
/// rather than as schema errors
#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

pub fn encode(state: &GameState, level: Option<&Level>) -> Result<String, SnapshotError> {
    let envelope = SnapshotRef {
        version: SNAPSHOT_VERSION,
        game_state: state,
        current_level: level,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a snapshot; `check` additionally runs integrity validation
pub fn decode(text: &str, check: bool) -> Result<Snapshot, SnapshotError> {
    let header: VersionHeader = serde_json::from_str(text)?;
    if header.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    let snapshot: Snapshot = serde_json::from_str(text)?;
    if check {
        validate(&snapshot)?;
    }
    Ok(snapshot)
}
