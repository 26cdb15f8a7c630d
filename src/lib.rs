//! Tabular Q-learning on procedurally generated grid mazes
//!
//! This crate provides:
//! - Procedural maze generation with a start-to-goal reachability guarantee
//! - A tabular Q-learning agent with ε-greedy exploration
//! - A training driver with pluggable observers and run statistics
//! - Export of training artifacts (episode history, learned value table)

pub mod cli;
pub mod error;
pub mod export;
pub mod maze;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use error::{Error, Result};
pub use maze::{GeneratorConfig, Maze, MazeGenerator};
pub use pipeline::{TrainingConfig, TrainingDriver, TrainingReport, TrainingStatistics};
pub use ports::TrainingObserver;
pub use q_learning::{ActionValues, EpisodeResult, ParameterUpdate, QLearningAgent, QTable};
pub use types::{Action, Position};
