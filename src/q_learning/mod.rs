//! Tabular Q-learning for maze navigation
//!
//! This module implements off-policy temporal difference learning over grid
//! positions. The agent follows an ε-greedy policy and updates one state
//! action pair per step:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//!
//! ## Reward design
//!
//! | Outcome | Reward |
//! |---------|--------|
//! | Move rejected (border or wall) | -10, agent stays put |
//! | Goal reached | +100 |
//! | Any other step | -1 |
//!
//! A rejected move still records a transition from the state to itself, so
//! the penalty flows into the value table and the agent learns to avoid
//! walls rather than merely bouncing off them.
//!
//! ## Usage Example
//!
//! ```no_run
//! use qmaze::maze::Maze;
//! use qmaze::q_learning::QLearningAgent;
//!
//! let maze = Maze::open(5)?;
//! let mut agent = QLearningAgent::new(
//!     5,   // maze_size
//!     0.1, // learning_rate
//!     0.9, // discount_factor
//!     0.2, // exploration_rate
//! )?
//! .with_seed(42);
//!
//! let result = agent.run_episode(&maze, maze.start(), maze.goal(), 1000)?;
//! println!("reached goal: {} in {} steps", result.success, result.steps);
//! # Ok::<(), qmaze::Error>(())
//! ```

pub mod agent;
pub mod q_table;

// Public re-exports
pub use agent::{EpisodeResult, ParameterUpdate, QLearningAgent};
pub use q_table::{ActionValues, QTable};
