//! Snapshot persistence with integrity verification
//!
//! Features:
//! - Versioned JSON envelope around `{GameState, current level}`
//! - Structural and semantic validation before a snapshot is accepted
//!
//! Snapshots live only in memory or on the wire; nothing here touches disk.

pub mod envelope;
pub mod validation;

use thiserror::Error;

pub use envelope::{SNAPSHOT_VERSION, Snapshot, decode, encode};
pub use validation::validate;

/// Why a snapshot was rejected
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("snapshot failed validation: {0}")]
    Invalid(String),
}
