//! Session facade: owns the state, the level catalog and per-player input,
//! and drives level loading around the per-tick pipeline

use std::collections::BTreeMap;

use super::level::{Level, LevelCatalog};
use super::state::{
    Enemy, GameEvent, GameState, GameStatus, InputPatch, InputState, LEVEL_TIME_TICKS, Player,
};
use super::tick::{TickOutcome, tick};
use crate::consts::MAX_ENEMIES;
use crate::persistence::{self, SnapshotError};

pub struct Engine {
    state: GameState,
    catalog: LevelCatalog,
    current_level: Option<Level>,
    inputs: BTreeMap<u32, InputState>,
    seed: u64,
    player_count: u8,
    validate_snapshots: bool,
}

impl Engine {
    /// Engine over the built-in levels, sitting in the menu
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(LevelCatalog::default(), seed)
    }

    pub fn with_catalog(catalog: LevelCatalog, seed: u64) -> Self {
        Self {
            state: GameState::new(seed),
            catalog,
            current_level: None,
            inputs: BTreeMap::new(),
            seed,
            player_count: 1,
            validate_snapshots: true,
        }
    }

    /// Whether `deserialize` runs integrity validation (on by default)
    pub fn set_snapshot_validation(&mut self, enabled: bool) {
        self.validate_snapshots = enabled;
    }

    /// Fresh session with one or two players, starting at level 1
    pub fn start_game(&mut self, player_count: u8) {
        let player_count = player_count.clamp(1, 2);
        log::info!("Starting game: {player_count} player(s), seed {}", self.seed);

        self.player_count = player_count;
        self.state = GameState::new(self.seed);
        self.inputs.clear();
        self.current_level = None;

        let first = self.catalog.get(1);
        for number in 1..=player_count {
            let spawn = first
                .and_then(|level| level.player_spawn(number))
                .unwrap_or_default();
            let id = self.state.next_entity_id();
            self.state.players.push(Player::new(id, number, spawn));
            self.inputs.insert(id, InputState::default());
        }

        self.state.status = GameStatus::Playing;
        self.load_level(1);
    }

    /// Advance `ticks` fixed steps; nothing happens unless playing
    pub fn update(&mut self, ticks: u32) {
        for _ in 0..ticks {
            if self.state.status != GameStatus::Playing {
                break;
            }
            let Some(level) = self.current_level.as_ref() else {
                break;
            };
            if tick(&mut self.state, level, &self.inputs) == TickOutcome::LevelCleared {
                let next = self.state.current_level + 1;
                self.load_level(next);
            }
        }
    }

    /// Merge a partial input update for a player. Unknown ids are ignored.
    pub fn set_input(&mut self, player_id: u32, patch: &InputPatch) {
        match self.inputs.get_mut(&player_id) {
            Some(input) => input.merge(patch),
            None => log::debug!("Input for unknown player {player_id} ignored"),
        }
    }

    pub fn input(&self, player_id: u32) -> Option<&InputState> {
        self.inputs.get(&player_id)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the state wholesale (replication). The level definition
    /// follows the new state's level number.
    pub fn set_state(&mut self, state: GameState) {
        if self.current_level.as_ref().map(|l| l.id) != Some(state.current_level) {
            self.current_level = self.catalog.get(state.current_level).cloned();
        }
        self.state = state;
        self.sync_inputs();
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.current_level.as_ref()
    }

    pub fn player_by_id(&self, id: u32) -> Option<&Player> {
        self.state.player_by_id(id)
    }

    pub fn player_by_number(&self, number: u8) -> Option<&Player> {
        self.state.player_by_number(number)
    }

    pub fn pause(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state.status = GameStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state.status == GameStatus::Paused {
            self.state.status = GameStatus::Playing;
        }
    }

    /// Start over with the same player count and seed
    pub fn restart(&mut self) {
        self.start_game(self.player_count);
    }

    /// Drain the events accumulated since the last call. At most
    /// `MAX_PENDING_EVENTS` are held; older ones are dropped first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn serialize(&self) -> Result<String, SnapshotError> {
        persistence::encode(&self.state, self.current_level.as_ref())
    }

    /// Restore from `serialize` output. On error the engine is untouched.
    pub fn deserialize(&mut self, text: &str) -> Result<(), SnapshotError> {
        let snapshot = persistence::decode(text, self.validate_snapshots)?;
        self.current_level = snapshot
            .current_level
            .or_else(|| self.catalog.get(snapshot.game_state.current_level).cloned());
        self.state = snapshot.game_state;
        self.sync_inputs();
        Ok(())
    }

    /// Keep exactly one input record per player in the state
    fn sync_inputs(&mut self) {
        let ids: Vec<u32> = self.state.players.iter().map(|p| p.id).collect();
        self.inputs.retain(|id, _| ids.contains(id));
        for id in ids {
            self.inputs.entry(id).or_default();
        }
    }

    /// Populate level `number`, or declare victory past the last one
    fn load_level(&mut self, number: u32) {
        let Some(level) = self.catalog.get(number).cloned() else {
            log::info!("No level {number}: victory");
            self.state.status = GameStatus::Victory;
            self.state.push_event(GameEvent::Victory);
            return;
        };
        log::info!("Loading level {number} ({})", level.name);

        let state = &mut self.state;
        state.current_level = number;
        state.enemies.clear();
        state.attacks.clear();
        state.power_ups.clear();
        state.time_remaining = LEVEL_TIME_TICKS;
        state.level_complete_timer = 0;

        for spawn in &level.enemies {
            let Some(&pos) = level.spawn_points.get(spawn.spawn_index) else {
                log::warn!(
                    "Level {number}: spawn index {} out of range, {:?} skipped",
                    spawn.spawn_index,
                    spawn.kind
                );
                continue;
            };
            if state.enemies.len() >= MAX_ENEMIES {
                log::warn!("Level {number}: enemy cap {MAX_ENEMIES} reached");
                break;
            }
            let enemy = Enemy::new(state.next_entity_id(), spawn.kind, pos, &mut state.rng);
            state.enemies.push(enemy);
        }

        for player in &mut state.players {
            if player.is_dead() && player.lives == 0 {
                continue;
            }
            if let Some(spawn) = level.player_spawn(player.number) {
                player.enter_level(spawn);
            }
        }

        state.push_event(GameEvent::LevelStarted { level: number });
        self.current_level = Some(level);
    }
}
