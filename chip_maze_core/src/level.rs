use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Heading, Position, board::TileKind, map::Grid};

/// Represents errors that can occur while building or looking up levels.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("Level index {index} is out of range for a catalog of {count} levels")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Level catalog is empty")]
    Empty,
    #[error("Map is empty")]
    EmptyMap,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map code '{token}' at position ({x}, {y})")]
    UnknownToken { token: String, x: usize, y: usize },
    #[error("No player start ('ST') found in map")]
    MissingStart,
    #[error("Multiple player starts found: {first:?} and {second:?}")]
    DuplicateStart { first: Position, second: Position },
    #[error("Agent spawn {0:?} is outside the map")]
    AgentOutOfBounds(Position),
    #[error("Agent spawn {0:?} is inside a wall")]
    AgentOnWall(Position),
    #[error("Failed to read level file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Initial position and heading of one patrolling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpawn {
    pub position: Position,
    pub heading: Heading,
}

/// An immutable, validated level: a tile grid plus the agents that patrol it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    name: String,
    grid: Grid<TileKind>,
    agents: Vec<AgentSpawn>,
    player_start: Position,
}

impl LevelDefinition {
    /// Validates and builds a level.
    ///
    /// The grid must contain exactly one [`TileKind::PlayerStart`], and every
    /// agent must spawn inside the grid on a non-wall tile.
    pub fn new(
        name: impl Into<String>,
        grid: Grid<TileKind>,
        agents: Vec<AgentSpawn>,
    ) -> Result<Self, LevelError> {
        let starts: Vec<Position> = grid
            .enumerate()
            .filter(|(_, tile)| **tile == TileKind::PlayerStart)
            .map(|(pos, _)| pos)
            .collect();
        let player_start = *starts.first().ok_or(LevelError::MissingStart)?;
        if let Some(&second) = starts.get(1) {
            return Err(LevelError::DuplicateStart {
                first: player_start,
                second,
            });
        }

        for spawn in &agents {
            match grid.get(spawn.position.x, spawn.position.y) {
                None => return Err(LevelError::AgentOutOfBounds(spawn.position)),
                Some(TileKind::Wall) => return Err(LevelError::AgentOnWall(spawn.position)),
                Some(_) => {}
            }
        }

        Ok(LevelDefinition {
            name: name.into(),
            grid,
            agents,
            player_start,
        })
    }

    /// Parses a level from its text form.
    ///
    /// Each non-blank line is one grid row of whitespace-separated codes:
    ///
    /// | code | tile |
    /// |------|------|
    /// | `..` | empty |
    /// | `WL` | wall |
    /// | `CH` | collectible |
    /// | `EX` | exit |
    /// | `ST` | player start |
    /// | `A>` / `A<` | agent start, heading right / left |
    /// | `TP` | teleporter |
    /// | `HZ` | hazard |
    ///
    /// Lines starting with `#` are comments. Agents are listed in row-major
    /// order of their start tiles.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        if lines.is_empty() {
            return Err(LevelError::EmptyMap);
        }

        let width = lines[0].split_whitespace().count();
        let mut rows = Vec::with_capacity(lines.len());
        let mut agents = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    found: tokens.len(),
                });
            }

            let mut row = Vec::with_capacity(width);
            for (x, token) in tokens.into_iter().enumerate() {
                let tile = match token {
                    ".." => TileKind::Empty,
                    "WL" => TileKind::Wall,
                    "CH" => TileKind::Collectible,
                    "EX" => TileKind::Exit,
                    "ST" => TileKind::PlayerStart,
                    "TP" => TileKind::Teleporter,
                    "HZ" => TileKind::Hazard,
                    "A>" | "A<" => {
                        let heading = if token == "A>" {
                            Heading::Right
                        } else {
                            Heading::Left
                        };
                        agents.push(AgentSpawn {
                            position: Position::new(x, y),
                            heading,
                        });
                        TileKind::AgentStart
                    }
                    unknown => {
                        return Err(LevelError::UnknownToken {
                            token: unknown.to_string(),
                            x,
                            y,
                        });
                    }
                };
                row.push(tile);
            }
            rows.push(row);
        }

        let grid = Grid::from_rows(rows).ok_or(LevelError::EmptyMap)?;
        LevelDefinition::new(name, grid, agents)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid<TileKind> {
        &self.grid
    }

    pub fn agents(&self) -> &[AgentSpawn] {
        &self.agents
    }

    /// The single [`TileKind::PlayerStart`] cell.
    pub fn player_start(&self) -> Position {
        self.player_start
    }
}

/// Ordered, non-empty list of levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

const BUILTIN_LEVELS: [(&str, &str); 3] = [
    (
        "INITIALIZATION",
        include_str!("../levels/01_initialization.txt"),
    ),
    (
        "SECURITY BREACH",
        include_str!("../levels/02_security_breach.txt"),
    ),
    ("QUANTUM MAZE", include_str!("../levels/03_quantum_maze.txt")),
];

impl LevelCatalog {
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        Ok(LevelCatalog { levels })
    }

    /// The three hand-authored levels shipped with the game.
    pub fn builtin() -> Result<Self, LevelError> {
        let levels = BUILTIN_LEVELS
            .iter()
            .map(|(name, text)| LevelDefinition::parse(*name, text))
            .collect::<Result<Vec<_>, _>>()?;
        LevelCatalog::new(levels)
    }

    /// Reads and parses one level per file, in the given order.
    ///
    /// Each level is named after its file stem.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, LevelError> {
        let mut levels = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            debug!(%name, path = %path.display(), "parsing level file");
            levels.push(LevelDefinition::parse(name, &text)?);
        }
        LevelCatalog::new(levels)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_at(&self, index: usize) -> Result<&LevelDefinition, LevelError> {
        self.levels.get(index).ok_or(LevelError::IndexOutOfRange {
            index,
            count: self.levels.len(),
        })
    }
}
