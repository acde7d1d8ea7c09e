//! Snowpush - headless runner
//!
//! Plays a scripted session as host with an in-process guest mirroring the
//! host's snapshots, then logs a summary. Usage: `snowpush [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use snowpush::consts::SIM_DT;
#[cfg(not(target_arch = "wasm32"))]
use snowpush::sim::{EnemyState, GameEvent, GameState, GameStatus, InputPatch, InputState};
#[cfg(not(target_arch = "wasm32"))]
use snowpush::{Engine, FixedStepDriver, Role, Settings};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SETTINGS_PATH: &str = "snowpush.json";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("snowpush: {e}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();
    log::info!("Snowpush (native) starting...");

    let mut host = Engine::new(settings.seed);
    host.set_snapshot_validation(settings.validate_snapshots);
    host.start_game(settings.player_count);
    let mut host_driver = FixedStepDriver::from_settings(Role::Host, &settings);

    let mut guest = Engine::new(settings.seed);
    guest.set_snapshot_validation(settings.validate_snapshots);
    let guest_driver = FixedStepDriver::from_settings(Role::Guest, &settings);

    let mut ticks = 0;
    while ticks < settings.demo_ticks && host.state().status == GameStatus::Playing {
        steer(&mut host);
        ticks += host_driver.advance(&mut host, SIM_DT);

        if let Some(snapshot) = host_driver.take_snapshot() {
            if let Err(e) = guest_driver.apply_snapshot(&mut guest, &snapshot) {
                log::error!("Guest rejected snapshot: {e}");
                return ExitCode::FAILURE;
            }
        }

        for event in host.take_events() {
            log_event(&event);
        }
    }

    summarize(host.state(), ticks);
    if guest.state().time_ticks != host.state().time_ticks {
        log::warn!(
            "Guest lagging: tick {} vs host tick {}",
            guest.state().time_ticks,
            host.state().time_ticks
        );
    }
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core has no browser entry point
}

/// Scripted play: chase the nearest enemy, shoot hard targets, shove
/// snowballs, hop now and then
#[cfg(not(target_arch = "wasm32"))]
fn steer(engine: &mut Engine) {
    let state = engine.state();
    let mut commands = Vec::with_capacity(state.players.len());

    for player in state.players.iter().filter(|p| !p.is_dead()) {
        let target = state
            .enemies
            .iter()
            .filter(|e| !e.is_dead() && !e.is_rolling())
            .min_by(|a, b| {
                let da = (a.body.pos - player.body.pos).length_squared();
                let db = (b.body.pos - player.body.pos).length_squared();
                da.total_cmp(&db)
            });

        let mut input = InputState::default();
        if let Some(enemy) = target {
            let dx = enemy.body.pos.x - player.body.pos.x;
            let dy = enemy.body.pos.y - player.body.pos.y;
            input.right = dx > 2.0;
            input.left = dx < -2.0;
            input.attack = enemy.state != EnemyState::Snowball && dx.abs() < 80.0;
            input.jump = dy < -24.0 && state.time_ticks % 45 == 0;
        }
        commands.push((player.id, InputPatch::from(input)));
    }

    for (id, patch) in commands {
        engine.set_input(id, &patch);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_event(event: &GameEvent) {
    match event {
        GameEvent::LevelStarted { level } => log::info!("Level {level} started"),
        GameEvent::EnemyKilled {
            enemy,
            score,
            combo,
        } => log::debug!("Enemy {enemy} killed for {score} (combo {combo})"),
        GameEvent::PlayerDied { player, lives_left } => {
            log::info!("Player {player} died, {lives_left} lives left")
        }
        other => log::trace!("{other:?}"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn summarize(state: &GameState, ticks: u32) {
    log::info!(
        "Ran {ticks} ticks: status {:?}, level {}, {} enemies left",
        state.status,
        state.current_level,
        state.enemies.len()
    );
    for player in &state.players {
        log::info!(
            "Player {}: score {}, lives {}",
            player.number,
            player.score,
            player.lives
        );
    }
}
