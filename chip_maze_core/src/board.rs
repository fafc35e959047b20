use serde::{Deserialize, Serialize};

use crate::{
    Position,
    level::LevelDefinition,
    map::{Grid, GridError},
};

/// Represents the kind of a cell in the level grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    Wall,
    Collectible,
    Exit,
    PlayerStart,
    AgentStart,
    Teleporter,
    /// Force field. Purely decorative, walkable by everyone.
    Hazard,
}

/// Represents errors raised by board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    OutOfBounds(#[from] GridError),
    #[error("Cannot collect at {position:?}: tile is {found:?}, not a collectible")]
    InvalidCollect { position: Position, found: TileKind },
}

/// Mutable tile state for one level attempt.
///
/// Invariant: `remaining` always equals the number of
/// [`TileKind::Collectible`] cells in `grid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    grid: Grid<TileKind>,
    total: usize,
    remaining: usize,
}

impl Board {
    /// Creates a board holding a fresh copy of `level`'s grid.
    pub fn from_level(level: &LevelDefinition) -> Self {
        let grid = level.grid().clone();
        let total = count_collectibles(&grid);
        Board {
            grid,
            total,
            remaining: total,
        }
    }

    /// Replaces all board state with a fresh copy of `level`'s grid.
    pub fn load(&mut self, level: &LevelDefinition) {
        *self = Board::from_level(level);
    }

    pub fn grid(&self) -> &Grid<TileKind> {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of collectibles present when the level was loaded.
    pub fn total_collectibles(&self) -> usize {
        self.total
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.remaining
    }

    /// Returns the tile at `(x, y)`.
    pub fn tile_at(&self, x: usize, y: usize) -> Result<TileKind, BoardError> {
        Ok(*self.grid.try_get(x, y)?)
    }

    /// Turns the collectible at `(x, y)` into an empty tile.
    ///
    /// Callers must check [`Board::is_collectible`] first; anything else is
    /// reported as [`BoardError::InvalidCollect`] and leaves the board untouched.
    pub fn collect(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        let found = self.tile_at(x, y)?;
        if found != TileKind::Collectible {
            return Err(BoardError::InvalidCollect {
                position: Position::new(x, y),
                found,
            });
        }
        self.grid.set(x, y, TileKind::Empty)?;
        self.remaining -= 1;
        Ok(())
    }

    /// Finds the teleporter paired with the one at `(x, y)`.
    ///
    /// This is the first other teleporter in row-major order. With more than
    /// two teleporters on a board every one of them leads to the same
    /// "first other" cell; with fewer than two there is no pair.
    pub fn find_paired_teleporter(&self, x: usize, y: usize) -> Option<Position> {
        self.grid
            .enumerate()
            .find(|(pos, tile)| **tile == TileKind::Teleporter && (pos.x, pos.y) != (x, y))
            .map(|(pos, _)| pos)
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.is_kind(x, y, TileKind::Wall)
    }

    pub fn is_exit(&self, x: usize, y: usize) -> bool {
        self.is_kind(x, y, TileKind::Exit)
    }

    pub fn is_collectible(&self, x: usize, y: usize) -> bool {
        self.is_kind(x, y, TileKind::Collectible)
    }

    pub fn is_teleporter(&self, x: usize, y: usize) -> bool {
        self.is_kind(x, y, TileKind::Teleporter)
    }

    #[inline]
    fn is_kind(&self, x: usize, y: usize, kind: TileKind) -> bool {
        self.grid.get(x, y) == Some(&kind)
    }
}

fn count_collectibles(grid: &Grid<TileKind>) -> usize {
    grid.iter()
        .filter(|tile| **tile == TileKind::Collectible)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        Board::from_level(&LevelDefinition::parse("test", text).unwrap())
    }

    #[test]
    fn load_counts_collectibles() {
        let b = board(
            "WL WL WL WL
             WL ST CH WL
             WL CH EX WL
             WL WL WL WL",
        );
        assert_eq!(b.total_collectibles(), 2);
        assert_eq!(b.remaining_collectibles(), 2);
        assert_eq!(b.tile_at(2, 1), Ok(TileKind::Collectible));
    }

    #[test]
    fn collect_clears_tile_and_decrements() {
        let mut b = board("ST CH CH");
        b.collect(1, 0).unwrap();
        assert_eq!(b.tile_at(1, 0), Ok(TileKind::Empty));
        assert_eq!(b.remaining_collectibles(), 1);
        assert_eq!(b.total_collectibles(), 2);
    }

    #[test]
    fn collect_on_other_tile_is_rejected() {
        let mut b = board("ST CH EX");
        let err = b.collect(2, 0).unwrap_err();
        assert_eq!(
            err,
            BoardError::InvalidCollect {
                position: Position::new(2, 0),
                found: TileKind::Exit,
            }
        );
        assert_eq!(b.remaining_collectibles(), 1);
        assert!(matches!(b.collect(9, 0), Err(BoardError::OutOfBounds(_))));
    }

    #[test]
    fn load_resets_collected_tiles() {
        let level = LevelDefinition::parse("test", "ST CH").unwrap();
        let mut b = Board::from_level(&level);
        b.collect(1, 0).unwrap();
        b.load(&level);
        assert_eq!(b.remaining_collectibles(), 1);
        assert!(b.is_collectible(1, 0));
    }

    #[test]
    fn tile_predicates_match_kinds() {
        let b = board("ST WL CH EX TP");
        assert!(b.is_wall(1, 0));
        assert!(b.is_collectible(2, 0));
        assert!(b.is_exit(3, 0));
        assert!(b.is_teleporter(4, 0));
        assert!(!b.is_exit(4, 0));
        assert!(!b.is_teleporter(3, 0));
        assert!(!b.is_exit(7, 7));
        assert!(!b.is_teleporter(0, 3));
    }

    #[test]
    fn tile_at_out_of_bounds() {
        let b = board("ST ..");
        assert!(matches!(
            b.tile_at(0, 1),
            Err(BoardError::OutOfBounds(GridError::OutOfBounds { x: 0, y: 1, .. }))
        ));
        assert!(!b.is_wall(5, 5));
    }

    #[test]
    fn paired_teleporter_uses_scan_order() {
        let b = board(
            "ST TP ..
             .. .. TP
             TP .. ..",
        );
        assert_eq!(b.find_paired_teleporter(1, 0), Some(Position::new(2, 1)));
        assert_eq!(b.find_paired_teleporter(2, 1), Some(Position::new(1, 0)));
        assert_eq!(b.find_paired_teleporter(0, 2), Some(Position::new(1, 0)));
    }

    #[test]
    fn lone_teleporter_has_no_pair() {
        let b = board("ST TP ..");
        assert_eq!(b.find_paired_teleporter(1, 0), None);
    }
}
