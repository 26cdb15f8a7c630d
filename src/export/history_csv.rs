//! CSV export of per-episode training history

use std::path::Path;

use serde::Serialize;

use crate::{Result, q_learning::EpisodeResult};

/// A single row in the history CSV export
#[derive(Debug, Clone, Serialize)]
struct HistoryRow {
    episode: usize,
    steps: usize,
    total_reward: f64,
    success: bool,
    final_x: Option<usize>,
    final_y: Option<usize>,
}

impl HistoryRow {
    fn new(episode: usize, result: &EpisodeResult) -> Self {
        let final_position = result.final_position();
        Self {
            episode,
            steps: result.steps,
            total_reward: result.total_reward,
            success: result.success,
            final_x: final_position.map(|p| p.x),
            final_y: final_position.map(|p| p.y),
        }
    }
}

/// Write episode results to a CSV file, one row per episode
///
/// `first_episode` numbers the first row; a driver's rolling history starts
/// at `episodes_run - history.len()`. Returns the number of rows written.
///
/// # Errors
///
/// Returns an error when the file cannot be created or a row fails to write.
pub fn write_history<'a, P, I>(path: P, first_episode: usize, episodes: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a EpisodeResult>,
{
    let mut writer = csv::Writer::from_path(path)?;

    let mut rows = 0;
    for (offset, result) in episodes.into_iter().enumerate() {
        writer.serialize(HistoryRow::new(first_episode + offset, result))?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}
