//! Level catalog
//!
//! Static stage layouts: platforms, enemy spawn points and declarations,
//! player spawns. Looked up by 1-based level number.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::EnemyKind;
use crate::consts::*;

/// A static box in the level. One-way platforms only catch bodies from above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub one_way: bool,
}

impl Platform {
    const THICKNESS: f32 = 8.0;

    fn ledge(x: f32, rise: f32, width: f32) -> Self {
        Self {
            x,
            y: GROUND_Y - rise,
            width,
            height: Self::THICKNESS,
            one_way: true,
        }
    }

    fn floor() -> Self {
        Self {
            x: 0.0,
            y: GROUND_Y - Self::THICKNESS,
            width: GAME_WIDTH,
            height: Self::THICKNESS,
            one_way: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// One enemy to seed when the level loads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Index into `Level::spawn_points`
    pub spawn_index: usize,
}

/// A complete stage definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub background_color: String,
    pub platforms: Vec<Platform>,
    pub spawn_points: Vec<Vec2>,
    pub player_spawns: Vec<Vec2>,
    pub enemies: Vec<EnemySpawn>,
}

impl Level {
    /// Spawn point for a player number (1-based), falling back to the first
    pub fn player_spawn(&self, player_number: u8) -> Option<Vec2> {
        let index = usize::from(player_number.saturating_sub(1));
        self.player_spawns
            .get(index)
            .or_else(|| self.player_spawns.first())
            .copied()
    }
}

/// Immutable set of levels, created once and handed to the engine
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::new(vec![round_one(), round_two(), boss_stage()])
    }
}

impl LevelCatalog {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    /// Look up a level by 1-based number; `None` past the last level
    pub fn get(&self, level_number: u32) -> Option<&Level> {
        let index = level_number.checked_sub(1)?;
        self.levels.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn point(x: f32, rise: f32) -> Vec2 {
    Vec2::new(x, GROUND_Y - rise)
}

fn default_player_spawns() -> Vec<Vec2> {
    vec![point(32.0, 32.0), point(GAME_WIDTH - 48.0, 32.0)]
}

fn spawns(list: &[(EnemyKind, usize)]) -> Vec<EnemySpawn> {
    list.iter()
        .map(|&(kind, spawn_index)| EnemySpawn { kind, spawn_index })
        .collect()
}

fn round_one() -> Level {
    use EnemyKind::*;
    let mid = GAME_WIDTH / 2.0;
    Level {
        id: 1,
        name: "ROUND 1".to_string(),
        background_color: "#1a1a2e".to_string(),
        platforms: vec![
            Platform::floor(),
            Platform::ledge(16.0, 48.0, 72.0),
            Platform::ledge(GAME_WIDTH - 88.0, 48.0, 72.0),
            Platform::ledge(mid - 40.0, 88.0, 80.0),
            Platform::ledge(24.0, 128.0, 64.0),
            Platform::ledge(GAME_WIDTH - 88.0, 128.0, 64.0),
            Platform::ledge(mid - 48.0, 168.0, 96.0),
        ],
        spawn_points: vec![
            point(32.0, 64.0),
            point(GAME_WIDTH - 48.0, 64.0),
            point(mid, 104.0),
            point(40.0, 144.0),
            point(GAME_WIDTH - 56.0, 144.0),
            point(mid, 184.0),
        ],
        player_spawns: default_player_spawns(),
        enemies: spawns(&[(Red, 0), (Red, 1), (Red, 2), (Red, 3), (Red, 4)]),
    }
}

fn round_two() -> Level {
    use EnemyKind::*;
    let mid = GAME_WIDTH / 2.0;
    Level {
        id: 2,
        name: "ROUND 2".to_string(),
        background_color: "#162447".to_string(),
        platforms: vec![
            Platform::floor(),
            Platform::ledge(0.0, 56.0, 48.0),
            Platform::ledge(GAME_WIDTH - 48.0, 56.0, 48.0),
            Platform::ledge(72.0, 56.0, 112.0),
            Platform::ledge(16.0, 104.0, 56.0),
            Platform::ledge(GAME_WIDTH - 72.0, 104.0, 56.0),
            Platform::ledge(mid - 32.0, 104.0, 64.0),
            Platform::ledge(56.0, 144.0, 48.0),
            Platform::ledge(GAME_WIDTH - 104.0, 144.0, 48.0),
            Platform::ledge(mid - 40.0, 180.0, 80.0),
        ],
        spawn_points: vec![
            point(24.0, 72.0),
            point(GAME_WIDTH - 40.0, 72.0),
            point(mid, 72.0),
            point(32.0, 120.0),
            point(GAME_WIDTH - 48.0, 120.0),
            point(72.0, 160.0),
            point(GAME_WIDTH - 88.0, 160.0),
            point(mid, 196.0),
        ],
        player_spawns: default_player_spawns(),
        enemies: spawns(&[(Red, 0), (Red, 1), (Blue, 2), (Blue, 3), (Red, 4), (Blue, 5)]),
    }
}

fn boss_stage() -> Level {
    use EnemyKind::*;
    let mid = GAME_WIDTH / 2.0;
    Level {
        id: 3,
        name: "BOSS STAGE".to_string(),
        background_color: "#2a0a3a".to_string(),
        platforms: vec![
            Platform::floor(),
            Platform::ledge(16.0, 48.0, 48.0),
            Platform::ledge(GAME_WIDTH - 64.0, 48.0, 48.0),
            Platform::ledge(0.0, 88.0, 64.0),
            Platform::ledge(GAME_WIDTH - 64.0, 88.0, 64.0),
            Platform::ledge(mid - 40.0, 96.0, 80.0),
            Platform::ledge(32.0, 136.0, 56.0),
            Platform::ledge(GAME_WIDTH - 88.0, 136.0, 56.0),
            Platform::ledge(mid - 48.0, 170.0, 96.0),
        ],
        spawn_points: vec![
            point(32.0, 64.0),
            point(GAME_WIDTH - 48.0, 64.0),
            point(16.0, 104.0),
            point(GAME_WIDTH - 32.0, 104.0),
            // Boss drops in over the top ledge
            point(mid - 16.0, 200.0),
        ],
        player_spawns: default_player_spawns(),
        enemies: spawns(&[(Red, 0), (Blue, 1), (Green, 2), (Blue, 3), (Boss, 4)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_one_based() {
        let catalog = LevelCatalog::default();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get(0).is_none());
        assert_eq!(catalog.get(1).map(|l| l.id), Some(1));
        assert_eq!(catalog.get(3).map(|l| l.name.as_str()), Some("BOSS STAGE"));
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn test_enemy_declarations_reference_spawn_points() {
        let catalog = LevelCatalog::default();
        for n in 1..=catalog.len() as u32 {
            let level = catalog.get(n).expect("level exists");
            for spawn in &level.enemies {
                assert!(spawn.spawn_index < level.spawn_points.len());
            }
            assert_eq!(level.player_spawns.len(), 2);
            assert!(!level.platforms[0].one_way, "floor must be solid");
        }
    }

    #[test]
    fn test_player_spawn_fallback() {
        let level = LevelCatalog::default().get(1).cloned().expect("level 1");
        assert_eq!(level.player_spawn(2), Some(point(GAME_WIDTH - 48.0, 32.0)));
        assert_eq!(level.player_spawn(0), level.player_spawn(1));
    }
}
