//! Train command - Train a Q-learning agent on a generated maze

use std::{
    collections::HashSet,
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    cli::output::{format_number, render_maze},
    export,
    maze::Maze,
    pipeline::{
        JsonlObserver, MetricsObserver, MilestoneObserver, ProgressObserver, TrainingConfig,
        TrainingDriver, TrainingStatistics,
    },
    q_learning::QLearningAgent,
    types::Position,
};

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent on a generated maze")]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 500)]
    pub episodes: usize,

    /// Step budget per episode
    #[arg(long, default_value_t = 1000)]
    pub max_steps: usize,

    /// Maze edge length
    #[arg(long, short = 's', default_value_t = 15)]
    pub maze_size: usize,

    /// Wall density (0.0-1.0)
    #[arg(long, short = 'd', default_value_t = 0.3)]
    pub wall_density: f64,

    /// Learning rate α (0.0-1.0)
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub discount_factor: f64,

    /// Exploration rate ε (0.0-1.0)
    #[arg(long, default_value_t = 0.2)]
    pub exploration_rate: f64,

    /// Episode results kept in the rolling history
    #[arg(long, default_value_t = 100)]
    pub history_limit: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,

    /// Learning-curve window size in episodes
    #[arg(long, default_value_t = 50)]
    pub window: usize,

    /// Print learning milestones during training
    #[arg(long, default_value_t = false)]
    pub milestones: bool,

    /// Optional file for JSONL episode records
    #[arg(long)]
    pub episode_log: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional path for writing the learned Q-table as JSON
    #[arg(long)]
    pub export_table: Option<PathBuf>,

    /// Optional path for writing the recent episode history as CSV
    #[arg(long)]
    pub history_csv: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    config: TrainingConfig,
    statistics: TrainingStatistics,
    elapsed_seconds: f64,
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

/// Walk the learned policy greedily from the start, without updating values
///
/// Stops at the goal, at an unvisited state, at a wall the greedy action runs
/// into, or when the walk revisits a cell.
pub(crate) fn greedy_path(agent: &QLearningAgent, maze: &Maze, max_steps: usize) -> Vec<Position> {
    let mut position = maze.start();
    let mut path = vec![position];
    let mut visited = HashSet::from([position]);

    for _ in 0..max_steps {
        if position == maze.goal() {
            break;
        }
        let Some(values) = agent.action_values(position) else {
            break;
        };
        let Some(next) = values
            .greedy()
            .apply(position, maze.size())
            .filter(|cell| !maze.is_wall(cell.x, cell.y))
        else {
            break;
        };
        if !visited.insert(next) {
            break;
        }
        position = next;
        path.push(position);
    }

    path
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = TrainingConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        maze_size: args.maze_size,
        wall_density: args.wall_density,
        learning_rate: args.learning_rate,
        discount_factor: args.discount_factor,
        exploration_rate: args.exploration_rate,
        history_limit: args.history_limit,
        seed: args.seed,
    };

    let summary_target = args.summary.as_ref().map(|raw| {
        let sanitized = sanitize_summary_path(raw);
        let normalized = sanitized != *raw;
        (sanitized, normalized)
    });

    let mut driver = TrainingDriver::new(config.clone())?;

    println!("=== Maze Q-Learning Training ===");
    println!(
        "Maze: {0}x{0}, wall density {1:.2}",
        config.maze_size, config.wall_density
    );
    println!(
        "Episodes: {} ({} steps max each)",
        format_number(config.episodes),
        format_number(config.max_steps)
    );
    println!(
        "Parameters: α={}, γ={}, ε={}",
        config.learning_rate, config.discount_factor, config.exploration_rate
    );
    if let Some(seed) = config.seed {
        println!("Seed: {seed}");
    }

    // Add progress bar unless quiet
    if !args.quiet {
        driver = driver.with_observer(Box::new(ProgressObserver::new()));
    }

    // Add metrics observer (wrapped in Arc<Mutex<>> to retrieve data later)
    let metrics = Arc::new(Mutex::new(MetricsObserver::new(args.window)?));
    {
        struct MetricsWrapper {
            inner: Arc<Mutex<MetricsObserver>>,
        }

        impl crate::ports::TrainingObserver for MetricsWrapper {
            fn on_episode_end(
                &mut self,
                episode: usize,
                result: &crate::q_learning::EpisodeResult,
            ) -> crate::Result<()> {
                self.inner.lock().unwrap().on_episode_end(episode, result)
            }

            fn on_training_end(&mut self) -> crate::Result<()> {
                self.inner.lock().unwrap().on_training_end()
            }
        }

        driver = driver.with_observer(Box::new(MetricsWrapper {
            inner: Arc::clone(&metrics),
        }));
    }

    // Add milestone observer if requested
    if args.milestones {
        let interval = (args.episodes / 10).max(1);
        driver = driver.with_observer(Box::new(MilestoneObserver::new(interval)?));
    }

    // Add JSONL observer if requested
    if let Some(log_path) = &args.episode_log {
        driver = driver.with_observer(Box::new(JsonlObserver::new(log_path)?));
    }

    let report = driver.run()?;
    let stats = &report.statistics;

    // Print results
    println!("\n=== Training Complete ===");
    println!("Episodes: {}", format_number(stats.episodes));
    println!(
        "Successes: {} ({:.1}%)",
        stats.successes,
        stats.success_rate * 100.0
    );
    println!("Average steps: {:.1}", stats.average_steps);
    match stats.best_steps {
        Some(best) => println!("Best episode: {best} steps"),
        None => println!("Best episode: none successful"),
    }
    println!("States explored: {}", format_number(stats.states_explored));
    println!("Max Q-value: {:.2}", stats.max_value);
    println!("Elapsed: {:.2}s", report.elapsed_seconds);

    // Print the learning curve when more than one window completed
    let curve = metrics.lock().unwrap().summary();
    if curve.windows.len() > 1 {
        println!("\n=== Learning Curve ===");
        for window in &curve.windows {
            println!(
                "  Episodes {:>6}-{:<6} success {:>5.1}%  avg steps {:>7.1}  avg reward {:>9.1}",
                window.start_episode + 1,
                window.start_episode + window.episodes,
                window.success_rate * 100.0,
                window.avg_steps,
                window.avg_reward
            );
        }
    }

    // Render the maze with the learned greedy route
    let route = greedy_path(driver.agent(), driver.maze(), config.max_steps);
    println!("\n=== Learned Route ===");
    println!("{}", render_maze(driver.maze(), &route));
    if route.last().copied() == Some(driver.maze().goal()) {
        println!("Greedy route: {} steps", route.len() - 1);
    } else {
        println!("Greedy route: incomplete");
    }

    // Export the Q-table if requested
    if let Some(table_path) = &args.export_table {
        let states = export::write_q_table(table_path, driver.agent())?;
        println!(
            "\n✓ Q-table written to {} ({} states)",
            table_path.display(),
            states
        );
    }

    // Export the recent history if requested
    if let Some(csv_path) = &args.history_csv {
        let first_episode = stats.episodes - driver.history().len();
        let rows = export::write_history(csv_path, first_episode, driver.history())?;
        println!("✓ History written to {} ({} rows)", csv_path.display(), rows);
    }

    if let Some((summary_path, normalized)) = summary_target {
        if normalized {
            println!(
                "\n⚠️  Normalizing summary path to {}",
                summary_path.display()
            );
        }

        if let Some(parent) = summary_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let summary = TrainingSummaryFile {
            config: config.clone(),
            statistics: stats.clone(),
            elapsed_seconds: report.elapsed_seconds,
        };

        let file = File::create(&summary_path)?;
        to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}
