use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timer cadences for a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Time between two agent patrol steps.
    pub agent_interval: Duration,
    /// Time between two cosmetic animation frames.
    pub animation_interval: Duration,
}

impl GameConfig {
    pub const DEFAULT_AGENT_INTERVAL: Duration = Duration::from_millis(800);
    pub const DEFAULT_ANIMATION_INTERVAL: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self {
            agent_interval: Self::DEFAULT_AGENT_INTERVAL,
            animation_interval: Self::DEFAULT_ANIMATION_INTERVAL,
        }
    }

    pub fn with_agent_interval(mut self, interval: Duration) -> Self {
        self.agent_interval = interval;
        self
    }

    pub fn with_animation_interval(mut self, interval: Duration) -> Self {
        self.animation_interval = interval;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
