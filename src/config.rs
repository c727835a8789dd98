use std::error::Error;
use std::fmt;

use crate::types::Vec2;

pub const MAZE_WIDTH: i32 = 21;
pub const MAZE_HEIGHT: i32 = 21;
pub const ENEMY_COUNT: usize = 3;
pub const PICKUP_COUNT: usize = 5;
pub const ENEMY_TICK_MS: u64 = 1_000;
pub const ROUND_DELAY_MS: u64 = 3_000;

pub const PLAYER_START: Vec2 = Vec2 { x: 1, y: 1 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    EvenDimension { axis: &'static str, value: i32 },
    DimensionTooSmall { axis: &'static str, value: i32 },
    TooManyEntities { kind: &'static str, requested: usize, free_cells: usize },
    ZeroEnemyTick,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvenDimension { axis, value } => {
                write!(f, "maze {axis} must be odd, got {value}")
            }
            Self::DimensionTooSmall { axis, value } => {
                write!(f, "maze {axis} must be at least 5, got {value}")
            }
            Self::TooManyEntities {
                kind,
                requested,
                free_cells,
            } => write!(
                f,
                "{kind} count {requested} exceeds the {free_cells} free floor cells of the maze"
            ),
            Self::ZeroEnemyTick => write!(f, "enemy tick period must be non-zero"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub enemy_count: usize,
    pub pickup_count: usize,
    pub enemy_tick_ms: u64,
    pub round_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: MAZE_WIDTH,
            height: MAZE_HEIGHT,
            enemy_count: ENEMY_COUNT,
            pickup_count: PICKUP_COUNT,
            enemy_tick_ms: ENEMY_TICK_MS,
            round_delay_ms: ROUND_DELAY_MS,
        }
    }
}

impl GameConfig {
    pub fn start(&self) -> Vec2 {
        PLAYER_START
    }

    pub fn goal(&self) -> Vec2 {
        Vec2::new(self.width - 2, self.height - 2)
    }

    /// Floor cells of a perfect maze carved with 2-cell steps:
    /// a*b odd cells plus a*b-1 connectors for a=(w-1)/2, b=(h-1)/2.
    pub fn floor_cell_count(&self) -> usize {
        let a = ((self.width - 1) / 2) as usize;
        let b = ((self.height - 1) / 2) as usize;
        2 * a * b - 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("width", self.width), ("height", self.height)] {
            if value < 5 {
                return Err(ConfigError::DimensionTooSmall { axis, value });
            }
            if value % 2 == 0 {
                return Err(ConfigError::EvenDimension { axis, value });
            }
        }
        if self.enemy_tick_ms == 0 {
            return Err(ConfigError::ZeroEnemyTick);
        }

        // Start and goal are always carved and always excluded.
        let free_cells = self.floor_cell_count() - 2;
        if self.enemy_count > free_cells {
            return Err(ConfigError::TooManyEntities {
                kind: "enemy",
                requested: self.enemy_count,
                free_cells,
            });
        }
        if self.pickup_count > free_cells {
            return Err(ConfigError::TooManyEntities {
                kind: "pickup",
                requested: self.pickup_count,
                free_cells,
            });
        }
        Ok(())
    }
}
