//! Fixed-cadence timers and the driver that wires them to a [`Game`].
//!
//! The animation clock and the agent clock never share state: animation runs
//! in every phase and only feeds renderers, while agent fires go through
//! [`Game::tick_agents`], which is inert unless the game is being played.

use std::time::Duration;

use tracing::trace;

use crate::{
    config::GameConfig,
    game::{Command, Game, GameError, GameView, MoveOutcome, Phase},
};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Converts elapsed wall time into a number of whole interval fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    accumulated: Duration,
}

impl Ticker {
    /// Creates a ticker firing every `interval` (at least one millisecond).
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval: interval.max(MIN_INTERVAL),
            accumulated: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Adds `elapsed` and returns how many intervals completed.
    ///
    /// Leftover time carries over to the next call.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut fired = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            fired += 1;
        }
        fired
    }

    /// Time left until the next fire.
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.accumulated)
    }
}

/// Free-running frame counter for cosmetic animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClock {
    ticker: Ticker,
    frame: u64,
}

impl AnimationClock {
    pub fn new(interval: Duration) -> Self {
        AnimationClock {
            ticker: Ticker::new(interval),
            frame: 0,
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        let fired = self.ticker.advance(elapsed);
        self.frame = self.frame.wrapping_add(u64::from(fired));
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Owns a [`Game`] and feeds it time and commands.
///
/// Everything runs on the caller's thread: each call finishes before the next
/// one starts, so commands and timer fires are applied in arrival order.
#[derive(Debug, Clone)]
pub struct Driver {
    game: Game,
    animation: AnimationClock,
    agent_clock: Ticker,
}

impl Driver {
    pub fn new(game: Game, config: &GameConfig) -> Self {
        Driver {
            game,
            animation: AnimationClock::new(config.animation_interval),
            agent_clock: Ticker::new(config.agent_interval),
        }
    }

    /// Lets `elapsed` pass on both clocks and returns the resulting phase.
    pub fn advance(&mut self, elapsed: Duration) -> Phase {
        self.animation.advance(elapsed);
        let fired = self.agent_clock.advance(elapsed);
        for _ in 0..fired {
            let phase = self.game.tick_agents();
            trace!(?phase, "agent tick");
        }
        self.game.phase()
    }

    pub fn handle(&mut self, command: Command) -> Result<MoveOutcome, GameError> {
        self.game.handle(command)
    }

    /// How long the caller may sleep before either clock fires again.
    pub fn until_next_fire(&self) -> Duration {
        self.animation
            .ticker
            .remaining()
            .min(self.agent_clock.remaining())
    }

    pub fn frame(&self) -> u64 {
        self.animation.frame()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn view(&self) -> GameView<'_> {
        self.game.view()
    }

    pub fn into_game(self) -> Game {
        self.game
    }
}
