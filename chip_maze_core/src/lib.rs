use serde::{Deserialize, Serialize};

pub mod agent;
pub mod avatar;
pub mod board;
pub mod clock;
pub mod config;
pub mod game;
pub mod level;
pub mod map;

pub use agent::{AgentController, AgentState};
pub use avatar::{AvatarStage, chips_to_next_evolution};
pub use board::{Board, BoardError, TileKind};
pub use clock::{AnimationClock, Driver, Ticker};
pub use config::GameConfig;
pub use game::{BlockReason, Command, Game, GameError, GameView, MoveOutcome, Phase, Session};
pub use level::{AgentSpawn, LevelCatalog, LevelDefinition, LevelError};

/// Represents a 2D coordinate: `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Offsets the position by `(dx, dy)`.
    ///
    /// Returns `None` if either coordinate would go below zero.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Position> {
        Some(Position {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

/// One of the four directions a player can step in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector `(dx, dy)` for this direction. Rows grow downwards.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Horizontal heading of a patrolling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Moving towards lower columns (-1).
    Left,
    /// Moving towards higher columns (+1).
    Right,
}

impl Heading {
    /// Column step for this heading: -1 or +1.
    pub const fn step(self) -> isize {
        match self {
            Heading::Left => -1,
            Heading::Right => 1,
        }
    }

    pub const fn reversed(self) -> Heading {
        match self {
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }
}
