//! Training driver for the maze navigation agent

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    maze::{GeneratorConfig, Maze, MazeGenerator, generate, grid::validate_size},
    ports::TrainingObserver,
    q_learning::{
        EpisodeResult, ParameterUpdate, QLearningAgent,
        agent::{validate_discount_factor, validate_exploration_rate, validate_learning_rate},
    },
    types::DEFAULT_MAX_STEPS,
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Step budget per episode
    pub max_steps: usize,

    /// Maze edge length
    pub maze_size: usize,

    /// Requested wall share in [0, 1]
    pub wall_density: f64,

    /// Learning rate α, in (0, 1]
    pub learning_rate: f64,

    /// Discount factor γ, in (0, 1]
    pub discount_factor: f64,

    /// Exploration rate ε, in [0, 1]
    pub exploration_rate: f64,

    /// Episode results kept in the rolling history
    pub history_limit: usize,

    /// Random seed. Maze and agent derive their own seeds from it.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            max_steps: DEFAULT_MAX_STEPS,
            maze_size: 15,
            wall_density: 0.3,
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.2,
            history_limit: 100,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Check every field against its valid range
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episode count must be at least 1".to_string(),
            });
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidConfiguration {
                message: "step budget must be at least 1".to_string(),
            });
        }
        if self.history_limit == 0 {
            return Err(Error::InvalidConfiguration {
                message: "history limit must be at least 1".to_string(),
            });
        }
        validate_size(self.maze_size)?;
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(Error::InvalidConfiguration {
                message: format!("wall density must be in [0, 1], got {}", self.wall_density),
            });
        }
        validate_learning_rate(self.learning_rate)?;
        validate_discount_factor(self.discount_factor)?;
        validate_exploration_rate(self.exploration_rate)?;
        Ok(())
    }
}

/// Snapshot of the driver's cumulative statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStatistics {
    /// Episodes completed
    pub episodes: usize,

    /// Steps across all episodes, counting rejected moves
    pub total_steps: usize,

    /// Episodes that reached the goal
    pub successes: usize,

    /// Success rate
    pub success_rate: f64,

    /// Average steps per episode
    pub average_steps: f64,

    /// Fewest steps of any successful episode
    pub best_steps: Option<usize>,

    /// Distinct states in the agent's value table
    pub states_explored: usize,

    /// Total stored action values
    pub total_values: usize,

    /// Highest value in the table
    pub max_value: f64,
}

/// Result of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Statistics at the end of the run
    pub statistics: TrainingStatistics,

    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
}

/// Training driver owning one maze, one agent, and the run accounting
///
/// Statistics accumulate across the driver's lifetime and clear only on
/// [`reset`](TrainingDriver::reset). Observers receive per-episode events from
/// every episode; the start and end events wrap [`run`](TrainingDriver::run)
/// only.
pub struct TrainingDriver {
    config: TrainingConfig,
    maze: Maze,
    agent: QLearningAgent,
    history: VecDeque<EpisodeResult>,
    episodes_run: usize,
    total_steps: usize,
    successes: usize,
    best_steps: Option<usize>,
    observers: Vec<Box<dyn TrainingObserver>>,
}

impl TrainingDriver {
    /// Create a new training driver
    ///
    /// Validates the configuration, generates the maze, and builds the agent.
    /// With a seed, the maze uses it directly and the agent receives the next
    /// value, so a rerun with the same configuration reproduces exactly.
    ///
    /// # Errors
    ///
    /// Returns an error when any configuration field falls outside its range.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;

        let maze = generate(config.maze_size, config.wall_density, config.seed)?;
        let mut agent = QLearningAgent::new(
            config.maze_size,
            config.learning_rate,
            config.discount_factor,
            config.exploration_rate,
        )?;
        if let Some(seed) = config.seed {
            agent = agent.with_seed(seed.wrapping_add(1));
        }

        Ok(Self {
            config,
            maze,
            agent,
            history: VecDeque::new(),
            episodes_run: 0,
            total_steps: 0,
            successes: 0,
            best_steps: None,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the driver
    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run a single training episode
    ///
    /// Records the result into the rolling history and the cumulative
    /// counters and notifies observers of the episode. Callers driving
    /// episodes one at a time get the same accounting as [`run`](TrainingDriver::run).
    pub fn train_episode(&mut self) -> Result<EpisodeResult> {
        let episode = self.episodes_run;

        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let result = self.agent.run_episode(
            &self.maze,
            self.maze.start(),
            self.maze.goal(),
            self.config.max_steps,
        )?;

        self.episodes_run += 1;
        self.total_steps += result.steps;
        if result.success {
            self.successes += 1;
            if self.best_steps.is_none_or(|best| result.steps < best) {
                self.best_steps = Some(result.steps);
            }
        }

        self.history.push_back(result.clone());
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }

        for observer in &mut self.observers {
            observer.on_episode_end(episode, &result)?;
        }

        Ok(result)
    }

    /// Run training for the configured episode count
    pub fn run(&mut self) -> Result<TrainingReport> {
        let started = Instant::now();

        // Notify observers of training start
        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes, &self.maze)?;
        }

        for _ in 0..self.config.episodes {
            self.train_episode()?;
        }

        // Notify observers of training end
        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingReport {
            statistics: self.statistics(),
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Snapshot the cumulative statistics
    pub fn statistics(&self) -> TrainingStatistics {
        let success_rate = if self.episodes_run > 0 {
            self.successes as f64 / self.episodes_run as f64
        } else {
            0.0
        };
        let average_steps = if self.episodes_run > 0 {
            self.total_steps as f64 / self.episodes_run as f64
        } else {
            0.0
        };

        TrainingStatistics {
            episodes: self.episodes_run,
            total_steps: self.total_steps,
            successes: self.successes,
            success_rate,
            average_steps,
            best_steps: self.best_steps,
            states_explored: self.agent.states_explored(),
            total_values: self.agent.total_values(),
            max_value: self.agent.max_value(),
        }
    }

    /// Forward a parameter update to the agent
    ///
    /// The stored configuration keeps the values the driver was built with;
    /// live parameters are read from [`agent`](TrainingDriver::agent).
    ///
    /// # Errors
    ///
    /// Returns an error when any provided value falls outside its range.
    pub fn update_parameters(&mut self, update: ParameterUpdate) -> Result<()> {
        self.agent.update_parameters(update)
    }

    /// Replace the maze with a freshly generated one
    ///
    /// The new maze must keep the agent's grid size. Learned values and
    /// counters carry over; call [`reset`](TrainingDriver::reset) to start
    /// over.
    ///
    /// # Errors
    ///
    /// Returns an error when the sizes differ or the configuration fails
    /// validation.
    pub fn rebuild_maze(&mut self, config: GeneratorConfig, seed: Option<u64>) -> Result<()> {
        if config.size != self.agent.maze_size() {
            return Err(Error::GridSizeMismatch {
                expected: self.agent.maze_size(),
                actual: config.size,
            });
        }

        let mut generator = MazeGenerator::new(config)?;
        if let Some(seed) = seed {
            generator = generator.with_seed(seed);
        }
        self.maze = generator.generate()?;
        Ok(())
    }

    /// Reset the agent's value table and clear history and counters
    pub fn reset(&mut self) {
        self.agent.reset();
        self.history.clear();
        self.episodes_run = 0;
        self.total_steps = 0;
        self.successes = 0;
        self.best_steps = None;
    }

    /// Get the rolling episode history, oldest first
    pub fn history(&self) -> &VecDeque<EpisodeResult> {
        &self.history
    }

    /// Get the current maze
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Get the agent
    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    /// Get mutable access to the agent for evaluation runs outside the
    /// driver's accounting
    pub fn agent_mut(&mut self) -> &mut QLearningAgent {
        &mut self.agent
    }

    /// Get the configuration the driver was built with
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            episodes: 20,
            max_steps: 200,
            maze_size: 5,
            wall_density: 0.2,
            history_limit: 8,
            seed: Some(42),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_training_driver_accumulates() {
        let mut driver = TrainingDriver::new(small_config()).unwrap();
        let report = driver.run().unwrap();

        let stats = report.statistics;
        assert_eq!(stats.episodes, 20);
        assert!(stats.successes <= stats.episodes);
        assert!((stats.success_rate - stats.successes as f64 / 20.0).abs() < 1e-9);
        assert!((stats.average_steps - stats.total_steps as f64 / 20.0).abs() < 1e-9);
        assert!(stats.states_explored > 0);
        assert_eq!(stats.total_values, stats.states_explored * 4);
        assert!(report.elapsed_seconds >= 0.0);

        // History keeps only the newest results.
        assert_eq!(driver.history().len(), 8);
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = small_config();
        config.episodes = 0;
        assert!(TrainingDriver::new(config).is_err());

        let mut config = small_config();
        config.history_limit = 0;
        assert!(TrainingDriver::new(config).is_err());

        let mut config = small_config();
        config.wall_density = 1.5;
        assert!(TrainingDriver::new(config).is_err());

        let mut config = small_config();
        config.learning_rate = 0.0;
        assert!(TrainingDriver::new(config).is_err());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut driver = TrainingDriver::new(small_config()).unwrap();
        driver.run().unwrap();
        assert!(driver.statistics().episodes > 0);

        driver.reset();
        let stats = driver.statistics();
        assert_eq!(stats.episodes, 0);
        assert_eq!(stats.total_steps, 0);
        assert_eq!(stats.successes, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.best_steps, None);
        assert_eq!(stats.states_explored, 0);
        assert!(driver.history().is_empty());
    }

    #[test]
    fn test_rebuild_maze_checks_size() {
        let mut driver = TrainingDriver::new(small_config()).unwrap();

        let mismatched = GeneratorConfig::new(7, 0.2).unwrap();
        assert!(matches!(
            driver.rebuild_maze(mismatched, Some(1)),
            Err(Error::GridSizeMismatch {
                expected: 5,
                actual: 7
            })
        ));

        let matching = GeneratorConfig::new(5, 0.4).unwrap();
        driver.rebuild_maze(matching, Some(1)).unwrap();
        assert!(driver.maze().is_solvable());
    }
}
