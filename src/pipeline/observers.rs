//! Observer pattern for training runs
//!
//! Observers allow composable data collection during training without coupling
//! the training driver to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    maze::Maze,
    ports::TrainingObserver,
    q_learning::EpisodeResult,
    types::Position,
};

/// Observation of a single training episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode number (0-based)
    pub episode: usize,
    /// Steps taken, counting rejected moves
    pub steps: usize,
    /// Sum of all step rewards
    pub total_reward: f64,
    /// Whether the goal was reached
    pub success: bool,
    /// Where the episode ended
    pub final_position: Option<Position>,
}

impl EpisodeRecord {
    fn new(episode: usize, result: &EpisodeResult) -> Self {
        Self {
            episode,
            steps: result.steps,
            total_reward: result.total_reward,
            success: result.success,
            final_position: result.final_position(),
        }
    }
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize, _maze: &Maze) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (S:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, result: &EpisodeResult) -> Result<()> {
        if result.success {
            self.successes += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position((episode + 1) as u64);
            pb.set_message(format!("{}", self.successes));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{}", self.successes));
        }
        Ok(())
    }
}

/// Metrics for one window of consecutive episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// First episode of the window (0-based)
    pub start_episode: usize,
    /// Episodes in the window
    pub episodes: usize,
    pub success_rate: f64,
    pub avg_steps: f64,
    pub avg_reward: f64,
}

/// Metrics observer - Tracks the learning curve in fixed windows
pub struct MetricsObserver {
    window: usize,
    windows: Vec<WindowMetrics>,
    window_successes: usize,
    window_steps: usize,
    window_reward: f64,
    window_episodes: usize,
    episodes: usize,
    successes: usize,
    total_steps: usize,
    total_reward: f64,
}

impl MetricsObserver {
    /// Create a new metrics observer with the given window size
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::InvalidConfiguration {
                message: "metrics window must be at least 1".to_string(),
            });
        }
        Ok(Self {
            window,
            windows: Vec::new(),
            window_successes: 0,
            window_steps: 0,
            window_reward: 0.0,
            window_episodes: 0,
            episodes: 0,
            successes: 0,
            total_steps: 0,
            total_reward: 0.0,
        })
    }

    /// Get overall success rate
    pub fn success_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.successes as f64 / self.episodes as f64
        }
    }

    /// Get overall average steps per episode
    pub fn avg_steps(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.episodes as f64
        }
    }

    /// Get overall average reward per episode
    pub fn avg_reward(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_reward / self.episodes as f64
        }
    }

    /// Get completed windows
    pub fn windows(&self) -> &[WindowMetrics] {
        &self.windows
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            successes: self.successes,
            success_rate: self.success_rate(),
            avg_steps: self.avg_steps(),
            avg_reward: self.avg_reward(),
            windows: self.windows.clone(),
        }
    }

    fn close_window(&mut self) {
        if self.window_episodes == 0 {
            return;
        }
        self.windows.push(WindowMetrics {
            start_episode: self.episodes - self.window_episodes,
            episodes: self.window_episodes,
            success_rate: self.window_successes as f64 / self.window_episodes as f64,
            avg_steps: self.window_steps as f64 / self.window_episodes as f64,
            avg_reward: self.window_reward / self.window_episodes as f64,
        });
        self.window_successes = 0;
        self.window_steps = 0;
        self.window_reward = 0.0;
        self.window_episodes = 0;
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub successes: usize,
    pub success_rate: f64,
    pub avg_steps: f64,
    pub avg_reward: f64,
    pub windows: Vec<WindowMetrics>,
}

impl TrainingObserver for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, result: &EpisodeResult) -> Result<()> {
        self.episodes += 1;
        self.total_steps += result.steps;
        self.total_reward += result.total_reward;
        self.window_episodes += 1;
        self.window_steps += result.steps;
        self.window_reward += result.total_reward;
        if result.success {
            self.successes += 1;
            self.window_successes += 1;
        }

        if self.window_episodes == self.window {
            self.close_window();
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        // Flush a partial trailing window.
        self.close_window();
        Ok(())
    }
}

/// JSONL observer - Exports one episode record per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }
}

impl TrainingObserver for JsonlObserver {
    fn on_episode_end(&mut self, episode: usize, result: &EpisodeResult) -> Result<()> {
        let record = EpisodeRecord::new(episode, result);

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Milestone observer - Tracks key learning achievements
///
/// Reports the first successful episode, improvements of the best step
/// count, and a periodic status line. Useful for watching convergence on
/// long runs without a full metrics export.
pub struct MilestoneObserver {
    /// Print a status line every this many episodes
    interval: usize,
    /// First episode that reached the goal (0-based)
    first_success: Option<usize>,
    /// Fewest steps of any successful episode
    best_steps: Option<usize>,
    /// Episode that set the current best (0-based)
    best_episode: Option<usize>,
    episodes: usize,
    successes: usize,
}

impl MilestoneObserver {
    /// Create a new milestone observer printing every `interval` episodes
    pub fn new(interval: usize) -> Result<Self> {
        if interval == 0 {
            return Err(Error::InvalidConfiguration {
                message: "milestone interval must be at least 1".to_string(),
            });
        }
        Ok(Self {
            interval,
            first_success: None,
            best_steps: None,
            best_episode: None,
            episodes: 0,
            successes: 0,
        })
    }

    /// Get the first successful episode (if any)
    pub fn first_success(&self) -> Option<usize> {
        self.first_success
    }

    /// Get the best step count among successful episodes (if any)
    pub fn best_steps(&self) -> Option<usize> {
        self.best_steps
    }

    /// Display milestone summary
    pub fn display_summary(&self) {
        println!("\n=== Learning Milestones ===");

        match self.first_success {
            Some(episode) => println!("  First success: episode #{}", episode + 1),
            None => println!("  First success: not achieved"),
        }

        match (self.best_steps, self.best_episode) {
            (Some(steps), Some(episode)) => {
                println!("  Best episode: {} steps (episode #{})", steps, episode + 1);
            }
            _ => println!("  Best episode: none successful"),
        }

        println!("  Successes: {}/{}", self.successes, self.episodes);
    }
}

impl TrainingObserver for MilestoneObserver {
    fn on_episode_end(&mut self, episode: usize, result: &EpisodeResult) -> Result<()> {
        self.episodes = episode + 1;

        if result.success {
            self.successes += 1;
            if self.first_success.is_none() {
                self.first_success = Some(episode);
                println!("  First success at episode #{} ({} steps)", episode + 1, result.steps);
            }
            if self.best_steps.is_none_or(|best| result.steps < best) {
                self.best_steps = Some(result.steps);
                self.best_episode = Some(episode);
            }
        }

        if self.episodes.is_multiple_of(self.interval) {
            let best = self
                .best_steps
                .map_or_else(|| "-".to_string(), |steps| steps.to_string());
            println!(
                "  Episode {:>6}: {} successes, best {} steps",
                self.episodes, self.successes, best
            );
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.display_summary();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(success: bool, steps: usize, total_reward: f64) -> EpisodeResult {
        EpisodeResult {
            trajectory: vec![Position::new(0, 0)],
            success,
            steps,
            total_reward,
        }
    }

    #[test]
    fn test_zero_sized_configurations_rejected() {
        assert!(MetricsObserver::new(0).is_err());
        assert!(MilestoneObserver::new(0).is_err());
    }

    #[test]
    fn test_metrics_observer_rates() {
        let mut observer = MetricsObserver::new(50).unwrap();

        assert_eq!(observer.success_rate(), 0.0);
        assert_eq!(observer.avg_steps(), 0.0);

        observer.on_episode_end(0, &episode(true, 10, 91.0)).unwrap();
        observer.on_episode_end(1, &episode(false, 20, -20.0)).unwrap();
        observer.on_episode_end(2, &episode(true, 6, 95.0)).unwrap();

        assert!((observer.success_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert!((observer.avg_steps() - 12.0).abs() < 1e-9);
        assert!((observer.avg_reward() - (91.0 - 20.0 + 95.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_observer_windows() {
        let mut observer = MetricsObserver::new(2).unwrap();

        observer.on_episode_end(0, &episode(true, 10, 91.0)).unwrap();
        observer.on_episode_end(1, &episode(false, 20, -20.0)).unwrap();
        observer.on_episode_end(2, &episode(true, 8, 93.0)).unwrap();
        observer.on_training_end().unwrap();

        let windows = observer.windows();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start_episode, 0);
        assert_eq!(windows[0].episodes, 2);
        assert!((windows[0].success_rate - 0.5).abs() < 1e-9);
        assert!((windows[0].avg_steps - 15.0).abs() < 1e-9);

        // Trailing partial window flushes on training end.
        assert_eq!(windows[1].start_episode, 2);
        assert_eq!(windows[1].episodes, 1);
        assert!((windows[1].success_rate - 1.0).abs() < 1e-9);

        let summary = observer.summary();
        assert_eq!(summary.episodes, 3);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.windows.len(), 2);
    }

    #[test]
    fn test_milestone_observer_tracks_best() {
        let mut observer = MilestoneObserver::new(100).unwrap();

        observer.on_episode_end(0, &episode(false, 50, -60.0)).unwrap();
        assert_eq!(observer.first_success(), None);

        observer.on_episode_end(1, &episode(true, 30, 71.0)).unwrap();
        assert_eq!(observer.first_success(), Some(1));
        assert_eq!(observer.best_steps(), Some(30));

        observer.on_episode_end(2, &episode(true, 40, 61.0)).unwrap();
        assert_eq!(observer.best_steps(), Some(30)); // Still the best

        observer.on_episode_end(3, &episode(true, 12, 89.0)).unwrap();
        assert_eq!(observer.best_steps(), Some(12));
        assert_eq!(observer.first_success(), Some(1)); // Still the first
    }
}
