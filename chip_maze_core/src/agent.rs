use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Heading, Position, board::Board, level::AgentSpawn};

/// Holds the state of one patrolling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
}

impl AgentState {
    /// Computes this agent's state after one patrol step.
    ///
    /// The agent walks along its row. If the next column falls outside the
    /// inner play area (`1..width-1`) or is a wall, it turns around and stays
    /// put for this step. Every other tile kind is walked over.
    pub fn patrol_step(&self, board: &Board) -> AgentState {
        let Position { x, y } = self.position;
        let blocked = match x.checked_add_signed(self.heading.step()) {
            Some(next_x) => next_x < 1 || next_x + 1 >= board.width() || board.is_wall(next_x, y),
            None => true,
        };

        if blocked {
            AgentState {
                position: self.position,
                heading: self.heading.reversed(),
            }
        } else {
            AgentState {
                position: Position::new(x.wrapping_add_signed(self.heading.step()), y),
                heading: self.heading,
            }
        }
    }
}

impl From<AgentSpawn> for AgentState {
    fn from(spawn: AgentSpawn) -> Self {
        AgentState {
            position: spawn.position,
            heading: spawn.heading,
        }
    }
}

/// Returns true if any of `agents` stands on `position`.
pub fn any_agent_at(agents: &[AgentState], position: Position) -> bool {
    agents.iter().any(|agent| agent.position == position)
}

/// Moves every agent of the current level attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentController {
    agents: Vec<AgentState>,
}

impl AgentController {
    pub fn from_spawns(spawns: &[AgentSpawn]) -> Self {
        AgentController {
            agents: spawns.iter().copied().map(AgentState::from).collect(),
        }
    }

    /// Puts every agent back on its spawn, discarding current state.
    pub fn reset(&mut self, spawns: &[AgentSpawn]) {
        *self = AgentController::from_spawns(spawns);
    }

    /// Advances all agents by one patrol step.
    ///
    /// Each new state is computed from the pre-tick state only. Agents never
    /// block each other, so the result does not depend on iteration order.
    pub fn advance_all(&mut self, board: &Board) {
        let next: Vec<AgentState> = self
            .agents
            .iter()
            .map(|agent| agent.patrol_step(board))
            .collect();
        for (index, (before, after)) in self.agents.iter().zip(&next).enumerate() {
            if before.heading != after.heading {
                trace!(agent = index, position = ?after.position, heading = ?after.heading, "agent bounced");
            }
        }
        self.agents = next;
    }

    pub fn agents(&self) -> &[AgentState] {
        &self.agents
    }

    /// Returns true if any agent stands on `position`.
    pub fn occupies(&self, position: Position) -> bool {
        any_agent_at(&self.agents, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelDefinition;

    fn board(text: &str) -> Board {
        Board::from_level(&LevelDefinition::parse("test", text).unwrap())
    }

    fn agent(x: usize, y: usize, heading: Heading) -> AgentState {
        AgentState {
            position: Position::new(x, y),
            heading,
        }
    }

    #[test]
    fn moves_straight_when_clear() {
        let b = board(
            "WL WL WL WL WL WL
             WL ST .. CH .. WL
             WL WL WL WL WL WL",
        );
        assert_eq!(agent(2, 1, Heading::Right).patrol_step(&b), agent(3, 1, Heading::Right));
        assert_eq!(agent(3, 1, Heading::Left).patrol_step(&b), agent(2, 1, Heading::Left));
    }

    #[test]
    fn bounces_at_left_edge_of_play_area() {
        // No walls at all, so only the border rule applies.
        let b = board(
            ".. .. .. .. ..
             .. ST .. .. ..",
        );
        assert_eq!(agent(1, 1, Heading::Left).patrol_step(&b), agent(1, 1, Heading::Right));
        assert_eq!(agent(3, 1, Heading::Right).patrol_step(&b), agent(3, 1, Heading::Left));
        assert_eq!(agent(0, 0, Heading::Left).patrol_step(&b), agent(0, 0, Heading::Right));
    }

    #[test]
    fn bounces_before_wall() {
        let b = board(
            "WL WL WL WL WL WL WL
             WL ST .. .. WL .. WL
             WL WL WL WL WL WL WL",
        );
        let start = agent(3, 1, Heading::Right);
        let bounced = start.patrol_step(&b);
        assert_eq!(bounced, agent(3, 1, Heading::Left));
        assert_eq!(bounced.patrol_step(&b), agent(2, 1, Heading::Left));
    }

    #[test]
    fn walks_over_non_wall_tiles() {
        let b = board("WL ST TP EX HZ CH .. WL");
        let mut state = agent(1, 0, Heading::Right);
        let mut columns = Vec::new();
        for _ in 0..6 {
            state = state.patrol_step(&b);
            columns.push(state.position.x);
        }
        assert_eq!(columns, vec![2, 3, 4, 5, 6, 6]);
        assert_eq!(state.heading, Heading::Left);
    }

    #[test]
    fn advance_all_updates_simultaneously() {
        let b = board(
            "WL WL WL WL WL WL
             WL ST .. .. .. WL
             WL WL WL WL WL WL",
        );
        let spawns = [
            AgentSpawn {
                position: Position::new(2, 1),
                heading: Heading::Right,
            },
            AgentSpawn {
                position: Position::new(3, 1),
                heading: Heading::Left,
            },
        ];
        let mut controller = AgentController::from_spawns(&spawns);
        controller.advance_all(&b);
        // Agents pass through each other.
        assert_eq!(
            controller.agents(),
            &[agent(3, 1, Heading::Right), agent(2, 1, Heading::Left)]
        );
        assert!(controller.occupies(Position::new(2, 1)));
        assert!(!controller.occupies(Position::new(1, 1)));

        controller.reset(&spawns);
        assert_eq!(
            controller.agents(),
            &[agent(2, 1, Heading::Right), agent(3, 1, Heading::Left)]
        );
    }
}
