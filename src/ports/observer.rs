//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use crate::{Result, maze::Maze, q_learning::EpisodeResult};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during
/// training. Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Windowed metrics for learning curves
/// - Milestone tracking for convergence checks
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture - a boundary
/// between the training driver and external observation mechanisms.
/// Different observation strategies are **adapters** that implement this port.
///
/// Episodes are atomic: the agent computes a full episode and returns the
/// complete result, so observation happens at episode granularity and there
/// is no per-step callback.
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(total_episodes, maze)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_episode_end(episode, result)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qmaze::{ports::TrainingObserver, q_learning::EpisodeResult};
///
/// struct CustomObserver {
///     successes: usize,
/// }
///
/// impl TrainingObserver for CustomObserver {
///     fn on_episode_end(
///         &mut self,
///         _episode: usize,
///         result: &EpisodeResult,
///     ) -> qmaze::Result<()> {
///         if result.success {
///             self.successes += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait TrainingObserver: Send {
    /// Called when training starts.
    ///
    /// This is the first method called in the observation lifecycle.
    ///
    /// # Parameters
    ///
    /// * `total_episodes` - Number of episodes that will be run
    /// * `maze` - The maze every episode runs on
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize, _maze: &Maze) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the episode (0-based)
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to reset per-episode state.
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode completes.
    ///
    /// # Parameters
    ///
    /// * `episode` - Index of the completed episode (0-based)
    /// * `result` - Trajectory, outcome, and reward of the episode
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to record episode outcomes.
    fn on_episode_end(&mut self, _episode: usize, _result: &EpisodeResult) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// This is the last method called in the observation lifecycle.
    /// Use this to finalize outputs, close files, or display summaries.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to perform cleanup or final reporting.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
