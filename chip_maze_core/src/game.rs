use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Direction, Position,
    agent::{AgentController, AgentState, any_agent_at},
    board::{Board, BoardError, TileKind},
    level::{LevelCatalog, LevelError},
    map::Grid,
};

/// Coarse game state. Gates which commands do anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    Won,
    Dead,
}

/// Abstract player input, already decoupled from any key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Confirm,
    /// Same as [`Command::Confirm`] while dead, ignored otherwise.
    Restart,
}

/// Why a move was absorbed without changing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    OutOfBounds,
    Wall,
    /// The exit stays shut while collectibles remain.
    ExitLocked,
}

/// Represents the outcome of processing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Moved,
    Collected,
    Teleported { from: Position, to: Position },
    Blocked(BlockReason),
    Won,
    Died,
    LevelLoaded { index: usize },
    /// The command has no meaning in the current phase.
    Ignored,
}

/// Represents errors surfaced by the engine.
///
/// These only occur on broken preconditions (bad catalog, inconsistent
/// board); regular play never produces them.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// State that outlives individual levels.
///
/// Created once when play starts and handed to [`Game::new`]. Level loads,
/// restarts and advancing never reset it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    collected_lifetime: u64,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Collectibles gathered over the whole session, across all levels and retries.
    pub fn collected_lifetime(&self) -> u64 {
        self.collected_lifetime
    }

    fn record_collect(&mut self) {
        self.collected_lifetime += 1;
    }
}

/// Read-only view handed to renderers after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct GameView<'a> {
    pub grid: &'a Grid<TileKind>,
    pub player: Position,
    pub agents: &'a [AgentState],
    pub collected_this_level: usize,
    pub total_this_level: usize,
    pub remaining: usize,
    pub collected_lifetime: u64,
    pub phase: Phase,
    pub level_index: usize,
    pub level_count: usize,
    pub level_name: &'a str,
}

impl GameView<'_> {
    /// True when the current level is the last one in the catalog.
    pub fn is_final_level(&self) -> bool {
        self.level_index + 1 >= self.level_count
    }

    pub fn agent_at(&self, position: Position) -> bool {
        any_agent_at(self.agents, position)
    }
}

/// The game-state engine: board, player, agents and phase for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    catalog: LevelCatalog,
    level_index: usize,
    board: Board,
    player: Position,
    agents: AgentController,
    phase: Phase,
    collected_this_level: usize,
    session: Session,
}

impl Game {
    /// Starts a game on the first level of `catalog`.
    pub fn new(catalog: LevelCatalog, session: Session) -> Result<Self, GameError> {
        let first = catalog.level_at(0)?;
        let board = Board::from_level(first);
        let player = first.player_start();
        let agents = AgentController::from_spawns(first.agents());
        info!(level = first.name(), "level loaded");

        Ok(Game {
            catalog,
            level_index: 0,
            board,
            player,
            agents,
            phase: Phase::Playing,
            collected_this_level: 0,
            session,
        })
    }

    /// Applies one command and reports what happened.
    pub fn handle(&mut self, command: Command) -> Result<MoveOutcome, GameError> {
        match command {
            Command::Move(direction) => self.attempt_move(direction),
            Command::Confirm => self.confirm(),
            Command::Restart => self.restart(),
        }
    }

    /// Tries to step the player one tile in `direction`.
    ///
    /// Out-of-bounds targets, walls and a locked exit absorb the move with no
    /// state change. Otherwise the player moves and the target tile's effect
    /// applies: collectibles are gathered, a teleporter forwards the player to
    /// its pair, an unlocked exit wins the level. Landing on an agent kills.
    pub fn attempt_move(&mut self, direction: Direction) -> Result<MoveOutcome, GameError> {
        if self.phase != Phase::Playing {
            return Ok(MoveOutcome::Ignored);
        }

        let (dx, dy) = direction.delta();
        let Some(target) = self
            .player
            .offset(dx, dy)
            .filter(|pos| self.board.grid().is_valid(pos.x, pos.y))
        else {
            return Ok(self.blocked(direction, BlockReason::OutOfBounds));
        };

        let tile = self.board.tile_at(target.x, target.y)?;
        let mut outcome = match tile {
            TileKind::Wall => return Ok(self.blocked(direction, BlockReason::Wall)),
            TileKind::Exit if self.board.remaining_collectibles() > 0 => {
                return Ok(self.blocked(direction, BlockReason::ExitLocked));
            }
            TileKind::Collectible => {
                self.board.collect(target.x, target.y)?;
                self.collected_this_level += 1;
                self.session.record_collect();
                debug!(
                    position = ?target,
                    remaining = self.board.remaining_collectibles(),
                    "collectible picked up"
                );
                MoveOutcome::Collected
            }
            _ => MoveOutcome::Moved,
        };
        self.player = target;

        if tile == TileKind::Teleporter {
            if let Some(pair) = self.board.find_paired_teleporter(target.x, target.y) {
                debug!(from = ?target, to = ?pair, "teleported");
                self.player = pair;
                outcome = MoveOutcome::Teleported {
                    from: target,
                    to: pair,
                };
            }
        }

        if tile == TileKind::Exit && self.board.remaining_collectibles() == 0 {
            self.set_phase(Phase::Won);
            return Ok(MoveOutcome::Won);
        }

        if self.check_collision() {
            return Ok(MoveOutcome::Died);
        }
        Ok(outcome)
    }

    /// Advances every agent one patrol step, then checks for contact.
    ///
    /// Inert outside [`Phase::Playing`], so a timer may keep firing freely.
    /// Returns the phase after the tick.
    pub fn tick_agents(&mut self) -> Phase {
        if self.phase == Phase::Playing {
            self.agents.advance_all(&self.board);
            self.check_collision();
        }
        self.phase
    }

    /// Acknowledges the end of a level.
    ///
    /// After a win this moves on to the next level, or does nothing once the
    /// last level is done. After a death it reloads the current level.
    pub fn confirm(&mut self) -> Result<MoveOutcome, GameError> {
        match self.phase {
            Phase::Playing => Ok(MoveOutcome::Ignored),
            Phase::Won => {
                let next = self.level_index + 1;
                if next < self.catalog.level_count() {
                    self.load_level(next)?;
                    Ok(MoveOutcome::LevelLoaded { index: next })
                } else {
                    Ok(MoveOutcome::Ignored)
                }
            }
            Phase::Dead => {
                self.load_level(self.level_index)?;
                Ok(MoveOutcome::LevelLoaded {
                    index: self.level_index,
                })
            }
        }
    }

    /// Retries the current level after a death. Ignored in any other phase.
    pub fn restart(&mut self) -> Result<MoveOutcome, GameError> {
        if self.phase == Phase::Dead {
            self.confirm()
        } else {
            Ok(MoveOutcome::Ignored)
        }
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            grid: self.board.grid(),
            player: self.player,
            agents: self.agents.agents(),
            collected_this_level: self.collected_this_level,
            total_this_level: self.board.total_collectibles(),
            remaining: self.board.remaining_collectibles(),
            collected_lifetime: self.session.collected_lifetime(),
            phase: self.phase,
            level_index: self.level_index,
            level_count: self.catalog.level_count(),
            level_name: self.current_level_name(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agents(&self) -> &[AgentState] {
        self.agents.agents()
    }

    pub fn collected_this_level(&self) -> usize {
        self.collected_this_level
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ends the game, handing back the session state.
    pub fn into_session(self) -> Session {
        self.session
    }

    fn current_level_name(&self) -> &str {
        self.catalog
            .level_at(self.level_index)
            .map(|level| level.name())
            .unwrap_or_default()
    }

    /// Resets board, player, agents and the per-level counter to the level's
    /// initial state. The session is left alone.
    fn load_level(&mut self, index: usize) -> Result<(), GameError> {
        let level = self.catalog.level_at(index)?;
        self.board.load(level);
        self.player = level.player_start();
        self.agents.reset(level.agents());
        self.collected_this_level = 0;
        self.level_index = index;
        info!(level = level.name(), index, "level loaded");
        self.set_phase(Phase::Playing);
        Ok(())
    }

    /// Kills the player if an agent shares their tile.
    fn check_collision(&mut self) -> bool {
        if self.phase == Phase::Playing && self.agents.occupies(self.player) {
            self.set_phase(Phase::Dead);
            true
        } else {
            false
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            info!(from = ?self.phase, to = ?phase, level = self.level_index, "phase changed");
        }
        self.phase = phase;
    }

    fn blocked(&self, direction: Direction, reason: BlockReason) -> MoveOutcome {
        debug!(?direction, ?reason, position = ?self.player, "move blocked");
        MoveOutcome::Blocked(reason)
    }
}
