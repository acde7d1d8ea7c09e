//! Integrity checks run before a snapshot may replace engine state

use super::{Snapshot, SnapshotError};
use crate::consts::{MAX_ATTACKS, MAX_ENEMIES, MAX_POWERUPS};
use crate::sim::enemy::FREEZE_MAX;
use crate::sim::physics::Body;
use crate::sim::{EnemyState, GameState};

const MAX_PLAYERS: usize = 2;

fn invalid(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::Invalid(msg.into())
}

/// Reject snapshots no engine could have produced
pub fn validate(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let state = &snapshot.game_state;
    validate_players(state)?;
    validate_enemies(state)?;
    validate_counts(state)?;

    match &snapshot.current_level {
        Some(level) if level.id != state.current_level => Err(invalid(format!(
            "level payload {} does not match current level {}",
            level.id, state.current_level
        ))),
        _ => Ok(()),
    }
}

fn validate_players(state: &GameState) -> Result<(), SnapshotError> {
    if state.players.len() > MAX_PLAYERS {
        return Err(invalid(format!("{} players", state.players.len())));
    }
    let mut seen = [false; MAX_PLAYERS];
    for player in &state.players {
        let slot = match player.number {
            1 | 2 => usize::from(player.number - 1),
            n => return Err(invalid(format!("player number {n}"))),
        };
        if seen[slot] {
            return Err(invalid(format!("duplicate player number {}", player.number)));
        }
        seen[slot] = true;
        check_body("player", player.id, &player.body)?;
    }
    Ok(())
}

fn validate_enemies(state: &GameState) -> Result<(), SnapshotError> {
    for enemy in &state.enemies {
        if enemy.freeze_level > FREEZE_MAX {
            return Err(invalid(format!(
                "enemy {} freeze level {}",
                enemy.id, enemy.freeze_level
            )));
        }
        if matches!(enemy.state, EnemyState::Snowball | EnemyState::Rolling)
            && enemy.freeze_level != FREEZE_MAX
        {
            return Err(invalid(format!(
                "enemy {} is a snowball at freeze level {}",
                enemy.id, enemy.freeze_level
            )));
        }
        check_body("enemy", enemy.id, &enemy.body)?;
    }
    Ok(())
}

fn validate_counts(state: &GameState) -> Result<(), SnapshotError> {
    let counts = [
        ("enemies", state.enemies.len(), MAX_ENEMIES),
        ("attacks", state.attacks.len(), MAX_ATTACKS),
        ("power-ups", state.power_ups.len(), MAX_POWERUPS),
    ];
    for (what, count, cap) in counts {
        if count > cap {
            return Err(invalid(format!("{count} {what} exceeds cap {cap}")));
        }
    }
    Ok(())
}

fn check_body(what: &str, id: u32, body: &Body) -> Result<(), SnapshotError> {
    if body.pos.is_finite() && body.vel.is_finite() && body.size.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{what} {id} has non-finite motion")))
    }
}
