//! Q-learning agent for maze navigation
//!
//! The agent owns the Q-table and the exploration policy. It learns online:
//! every step of an episode applies one temporal difference update, including
//! steps rejected by a wall, which update the state against itself.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    maze::Maze,
    maze::grid::validate_size,
    q_learning::q_table::{ActionValues, QTable},
    types::{Action, Position, reward},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Outcome of one episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Every visited position in order, starting with the start cell. A
    /// rejected move appends the unchanged position.
    pub trajectory: Vec<Position>,
    /// Whether the goal was reached within the step budget.
    pub success: bool,
    /// Steps taken, counting rejected moves.
    pub steps: usize,
    /// Sum of all step rewards.
    pub total_reward: f64,
}

impl EpisodeResult {
    /// Last visited position. `None` only for an empty trajectory, which
    /// [`QLearningAgent::run_episode`] never produces.
    pub fn final_position(&self) -> Option<Position> {
        self.trajectory.last().copied()
    }
}

/// Partial update of the agent's learning parameters
///
/// Unset fields keep their current values. Applied atomically: every provided
/// value validates before any takes effect.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub learning_rate: Option<f64>,
    pub discount_factor: Option<f64>,
    pub exploration_rate: Option<f64>,
}

impl ParameterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate(mut self, value: f64) -> Self {
        self.learning_rate = Some(value);
        self
    }

    pub fn with_discount_factor(mut self, value: f64) -> Self {
        self.discount_factor = Some(value);
        self
    }

    pub fn with_exploration_rate(mut self, value: f64) -> Self {
        self.exploration_rate = Some(value);
        self
    }
}

/// Tabular Q-learning agent (off-policy TD control)
///
/// Built for one grid size; running it against a grid of another size is an
/// error. The value table starts empty and grows lazily as states are
/// visited.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    maze_size: usize,
    q_table: QTable,
    /// Exploration rate ε
    exploration_rate: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `maze_size` - Edge length of the grids this agent runs on
    /// * `learning_rate` - α parameter, in (0, 1]
    /// * `discount_factor` - γ parameter, in (0, 1]
    /// * `exploration_rate` - ε parameter, in [0, 1]
    ///
    /// # Errors
    ///
    /// Returns an error when any parameter falls outside its range.
    pub fn new(
        maze_size: usize,
        learning_rate: f64,
        discount_factor: f64,
        exploration_rate: f64,
    ) -> Result<Self> {
        validate_size(maze_size)?;
        validate_learning_rate(learning_rate)?;
        validate_discount_factor(discount_factor)?;
        validate_exploration_rate(exploration_rate)?;

        Ok(Self {
            maze_size,
            q_table: QTable::new(learning_rate, discount_factor),
            exploration_rate,
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    /// ε-greedy action selection. Initializes the state's values when unseen,
    /// on both branches.
    pub fn choose_action(&mut self, state: Position) -> Action {
        self.q_table.touch(state);
        if self.rng.random::<f64>() < self.exploration_rate {
            // Explore: random action
            Action::ALL[self.rng.random_range(0..Action::ALL.len())]
        } else {
            // Exploit: greedy action based on stored values
            self.q_table.greedy_action(state)
        }
    }

    /// Apply one Q-learning update.
    pub fn update(&mut self, state: Position, action: Action, reward: f64, next_state: Position) {
        self.q_table.q_learning_update(state, action, reward, next_state);
    }

    /// Run one episode from `start` toward `goal`, learning along the way.
    ///
    /// Each step selects an action, scores the candidate cell (penalty when
    /// the move leaves the grid or hits a wall, in which case the agent stays
    /// put but the transition is still recorded against the unchanged state),
    /// applies the value update, and advances. The episode ends the moment
    /// the position equals `goal`, or after `max_steps` steps with
    /// `success == false`. Running out of steps is a normal outcome, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error when the grid size does not match the agent or when
    /// `start` or `goal` lies outside the grid.
    pub fn run_episode(
        &mut self,
        maze: &Maze,
        start: Position,
        goal: Position,
        max_steps: usize,
    ) -> Result<EpisodeResult> {
        if maze.size() != self.maze_size {
            return Err(Error::GridSizeMismatch {
                expected: self.maze_size,
                actual: maze.size(),
            });
        }
        for position in [start, goal] {
            if position.x >= maze.size() || position.y >= maze.size() {
                return Err(Error::OutOfBounds {
                    x: position.x,
                    y: position.y,
                    size: maze.size(),
                });
            }
        }

        let mut position = start;
        let mut trajectory = vec![start];
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut success = position == goal;

        while steps < max_steps && !success {
            let action = self.choose_action(position);
            let candidate = action
                .apply(position, maze.size())
                .filter(|cell| !maze.is_wall(cell.x, cell.y));

            let step_reward = match candidate {
                Some(cell) if cell == goal => reward::GOAL,
                Some(_) => reward::STEP,
                None => reward::INVALID_MOVE,
            };
            let next_position = candidate.unwrap_or(position);

            self.q_table
                .q_learning_update(position, action, step_reward, next_position);

            total_reward += step_reward;
            position = next_position;
            trajectory.push(position);
            steps += 1;
            if position == goal {
                success = true;
            }
        }

        Ok(EpisodeResult {
            trajectory,
            success,
            steps,
            total_reward,
        })
    }

    /// Apply new learning parameters, keeping unset fields.
    ///
    /// # Errors
    ///
    /// Returns an error when any provided value falls outside its range; no
    /// field changes in that case.
    pub fn update_parameters(&mut self, update: ParameterUpdate) -> Result<()> {
        if let Some(value) = update.learning_rate {
            validate_learning_rate(value)?;
        }
        if let Some(value) = update.discount_factor {
            validate_discount_factor(value)?;
        }
        if let Some(value) = update.exploration_rate {
            validate_exploration_rate(value)?;
        }

        if let Some(value) = update.learning_rate {
            self.q_table.set_learning_rate(value);
        }
        if let Some(value) = update.discount_factor {
            self.q_table.set_discount_factor(value);
        }
        if let Some(value) = update.exploration_rate {
            self.exploration_rate = value;
        }
        Ok(())
    }

    /// Stored values for a state, without initializing unseen states.
    pub fn action_values(&self, state: Position) -> Option<ActionValues> {
        self.q_table.action_values(state)
    }

    /// Number of distinct states the agent has touched.
    pub fn states_explored(&self) -> usize {
        self.q_table.states_explored()
    }

    /// Total stored action values.
    pub fn total_values(&self) -> usize {
        self.q_table.total_values()
    }

    /// Highest value in the table, 0.0 when empty.
    pub fn max_value(&self) -> f64 {
        self.q_table.max_value()
    }

    /// Snapshot of the whole table ordered by position.
    pub fn export_table(&self) -> BTreeMap<Position, ActionValues> {
        self.q_table.export()
    }

    /// Clear the value table. Learning parameters keep their values; a seeded
    /// random source rewinds so a reset run reproduces.
    pub fn reset(&mut self) {
        self.q_table.clear();
        self.rng = build_rng(self.rng_seed);
    }

    pub fn maze_size(&self) -> usize {
        self.maze_size
    }

    pub fn learning_rate(&self) -> f64 {
        self.q_table.learning_rate()
    }

    pub fn discount_factor(&self) -> f64 {
        self.q_table.discount_factor()
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }
}

pub(crate) fn validate_learning_rate(value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("learning rate must be in (0, 1], got {value}"),
        })
    }
}

pub(crate) fn validate_discount_factor(value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("discount factor must be in (0, 1], got {value}"),
        })
    }
}

pub(crate) fn validate_exploration_rate(value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("exploration rate must be in [0, 1], got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greedy_agent(maze_size: usize) -> QLearningAgent {
        QLearningAgent::new(maze_size, 0.5, 0.9, 0.0)
            .unwrap()
            .with_seed(42)
    }

    #[test]
    fn test_parameter_validation() {
        assert!(QLearningAgent::new(1, 0.5, 0.9, 0.1).is_err());
        assert!(QLearningAgent::new(5, 0.0, 0.9, 0.1).is_err());
        assert!(QLearningAgent::new(5, 1.5, 0.9, 0.1).is_err());
        assert!(QLearningAgent::new(5, 0.5, 0.0, 0.1).is_err());
        assert!(QLearningAgent::new(5, 0.5, 1.1, 0.1).is_err());
        assert!(QLearningAgent::new(5, 0.5, 0.9, -0.1).is_err());
        assert!(QLearningAgent::new(5, 0.5, 0.9, 1.1).is_err());
        assert!(QLearningAgent::new(5, 1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_choose_action_initializes_state() {
        let mut agent = greedy_agent(5);
        let state = Position::new(2, 2);
        assert!(agent.action_values(state).is_none());

        // Greedy branch touches the state and picks the first tied action.
        assert_eq!(agent.choose_action(state), Action::Up);
        assert!(agent.action_values(state).is_some());

        // Exploring branch touches as well.
        let mut explorer = QLearningAgent::new(5, 0.5, 0.9, 1.0).unwrap().with_seed(7);
        let other = Position::new(3, 1);
        explorer.choose_action(other);
        assert!(explorer.action_values(other).is_some());
    }

    #[test]
    fn test_greedy_episode_on_open_2x2() {
        // Hand-traced with ties breaking up, right, down, left and all
        // values starting at zero:
        //   1. up is rejected at the border (-10), the agent stays put
        //   2. right moves to (1, 0) (-1)
        //   3. up is rejected again (-10)
        //   4. right is rejected (-10)
        //   5. down reaches the goal (+100)
        let maze = Maze::open(2).unwrap();
        let mut agent = greedy_agent(2);
        let result = agent
            .run_episode(&maze, maze.start(), maze.goal(), 50)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.steps, 5);
        assert!((result.total_reward - 69.0).abs() < 1e-9);
        assert_eq!(
            result.trajectory,
            vec![
                Position::new(0, 0),
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 0),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
        assert_eq!(result.final_position(), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_wall_rejection_updates_self_loop() {
        let maze = Maze::open(3).unwrap();
        let mut agent = greedy_agent(3);

        // One step: up from the start is rejected at the border.
        let result = agent
            .run_episode(&maze, maze.start(), maze.goal(), 1)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.steps, 1);
        assert!((result.total_reward - reward::INVALID_MOVE).abs() < 1e-9);
        assert_eq!(
            result.trajectory,
            vec![Position::new(0, 0), Position::new(0, 0)]
        );

        // The rejected move was learned against the unchanged state.
        let values = agent.action_values(Position::new(0, 0)).unwrap();
        assert!(values[Action::Up] < 0.0);
    }

    #[test]
    fn test_run_episode_rejects_wrong_grid_size() {
        let maze = Maze::open(4).unwrap();
        let mut agent = greedy_agent(3);
        let result = agent.run_episode(&maze, maze.start(), maze.goal(), 10);
        assert!(matches!(
            result,
            Err(Error::GridSizeMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_run_episode_rejects_out_of_bounds_endpoints() {
        let maze = Maze::open(3).unwrap();
        let mut agent = greedy_agent(3);
        let result = agent.run_episode(&maze, Position::new(0, 0), Position::new(3, 3), 10);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_update_parameters_is_atomic() {
        let mut agent = greedy_agent(4);
        let update = ParameterUpdate::new()
            .with_learning_rate(0.2)
            .with_exploration_rate(1.5);
        assert!(agent.update_parameters(update).is_err());

        // Nothing changed because one value was invalid.
        assert_eq!(agent.learning_rate(), 0.5);
        assert_eq!(agent.exploration_rate(), 0.0);

        let update = ParameterUpdate::new()
            .with_learning_rate(0.2)
            .with_discount_factor(0.8)
            .with_exploration_rate(0.3);
        agent.update_parameters(update).unwrap();
        assert_eq!(agent.learning_rate(), 0.2);
        assert_eq!(agent.discount_factor(), 0.8);
        assert_eq!(agent.exploration_rate(), 0.3);
    }

    #[test]
    fn test_reset_clears_table_and_keeps_parameters() {
        let maze = Maze::open(3).unwrap();
        let mut agent = QLearningAgent::new(3, 0.4, 0.95, 0.2).unwrap().with_seed(9);
        agent
            .run_episode(&maze, maze.start(), maze.goal(), 100)
            .unwrap();
        assert!(agent.states_explored() > 0);

        agent.reset();
        assert_eq!(agent.states_explored(), 0);
        assert_eq!(agent.total_values(), 0);
        assert_eq!(agent.max_value(), 0.0);
        assert_eq!(agent.learning_rate(), 0.4);
        assert_eq!(agent.discount_factor(), 0.95);
        assert_eq!(agent.exploration_rate(), 0.2);
    }

    #[test]
    fn test_seeded_agents_replay_identically() {
        let maze = Maze::open(5).unwrap();
        let mut first = QLearningAgent::new(5, 0.3, 0.9, 0.4).unwrap().with_seed(123);
        let mut second = QLearningAgent::new(5, 0.3, 0.9, 0.4).unwrap().with_seed(123);

        for _ in 0..5 {
            let a = first
                .run_episode(&maze, maze.start(), maze.goal(), 200)
                .unwrap();
            let b = second
                .run_episode(&maze, maze.start(), maze.goal(), 200)
                .unwrap();
            assert_eq!(a.trajectory, b.trajectory);
            assert_eq!(a.total_reward, b.total_reward);
        }
    }

    #[test]
    fn test_total_values_multiple_of_four() {
        let maze = Maze::open(4).unwrap();
        let mut agent = QLearningAgent::new(4, 0.5, 0.9, 0.5).unwrap().with_seed(1);
        agent
            .run_episode(&maze, maze.start(), maze.goal(), 100)
            .unwrap();
        assert_eq!(agent.total_values(), agent.states_explored() * 4);
    }
}
