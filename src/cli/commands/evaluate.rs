//! Evaluate command - Train an agent, then measure its greedy policy

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::{
    pipeline::{ProgressObserver, TrainingConfig, TrainingDriver, TrainingStatistics},
    q_learning::ParameterUpdate,
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent, then evaluate it with exploration frozen")]
pub struct EvaluateArgs {
    /// Number of training episodes before evaluation
    #[arg(long, short = 'e', default_value_t = 500)]
    pub episodes: usize,

    /// Number of greedy evaluation episodes
    #[arg(long, short = 'g', default_value_t = 100)]
    pub eval_episodes: usize,

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

    /// Exploration rate ε during training (0.0-1.0)
    #[arg(long, default_value_t = 0.2)]
    pub exploration_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Summary of the greedy evaluation episodes
struct EvaluationStats {
    episodes: usize,
    successes: usize,
    success_rate: f64,
    mean_steps: f64,
    std_dev_steps: f64,
    min_steps: f64,
    max_steps: f64,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    if args.eval_episodes == 0 {
        return Err(anyhow!("--eval-episodes must be at least 1"));
    }

    let config = TrainingConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        maze_size: args.maze_size,
        wall_density: args.wall_density,
        learning_rate: args.learning_rate,
        discount_factor: args.discount_factor,
        exploration_rate: args.exploration_rate,
        seed: args.seed,
        ..TrainingConfig::default()
    };

    println!("=== Training Phase ===");
    println!(
        "Maze: {0}x{0}, wall density {1:.2}",
        config.maze_size, config.wall_density
    );
    println!("Episodes: {}", config.episodes);
    if let Some(seed) = config.seed {
        println!("Seed: {seed}");
    }

    let mut driver = TrainingDriver::new(config)?;
    if !args.quiet {
        driver = driver.with_observer(Box::new(ProgressObserver::new()));
    }
    let report = driver.run()?;
    let training_stats = report.statistics;

    println!(
        "Training: {} successes ({:.1}%), {} states explored",
        training_stats.successes,
        training_stats.success_rate * 100.0,
        training_stats.states_explored
    );

    // Freeze exploration for evaluation
    driver.update_parameters(ParameterUpdate::new().with_exploration_rate(0.0))?;

    println!("\n=== Running Evaluation ===");
    println!("Greedy episodes: {}", args.eval_episodes);

    let maze = driver.maze().clone();
    let agent = driver.agent_mut();

    let mut step_counts: Vec<f64> = Vec::with_capacity(args.eval_episodes);
    let mut successes = 0;
    for _ in 0..args.eval_episodes {
        let result = agent.run_episode(&maze, maze.start(), maze.goal(), args.max_steps)?;
        if result.success {
            successes += 1;
        }
        step_counts.push(result.steps as f64);
    }

    let evaluation = EvaluationStats {
        episodes: args.eval_episodes,
        successes,
        success_rate: successes as f64 / args.eval_episodes as f64,
        mean_steps: (&step_counts).mean(),
        std_dev_steps: if step_counts.len() > 1 {
            (&step_counts).std_dev()
        } else {
            0.0
        },
        min_steps: (&step_counts).min(),
        max_steps: (&step_counts).max(),
    };

    // Print results
    println!("\n=== Evaluation Results ===");
    println!("Episodes: {}", evaluation.episodes);
    println!(
        "Successes: {} ({:.1}%)",
        evaluation.successes,
        evaluation.success_rate * 100.0
    );
    println!(
        "Steps: mean {:.1}, std {:.1}, min {:.0}, max {:.0}",
        evaluation.mean_steps, evaluation.std_dev_steps, evaluation.min_steps, evaluation.max_steps
    );

    // Export if requested
    if let Some(export_path) = &args.export {
        export_results(&args, &training_stats, &evaluation, export_path)?;
        println!("\n✓ Results exported to: {}", export_path.display());
    }

    Ok(())
}

/// Export evaluation results to JSON
fn export_results(
    args: &EvaluateArgs,
    training: &TrainingStatistics,
    evaluation: &EvaluationStats,
    path: &PathBuf,
) -> Result<()> {
    use std::fs::File;

    #[derive(Serialize)]
    struct EvaluationExport {
        configuration: ConfigurationSection,
        training: TrainingSection,
        evaluation: EvaluationSection,
    }

    #[derive(Serialize)]
    struct ConfigurationSection {
        maze_size: usize,
        wall_density: f64,
        learning_rate: f64,
        discount_factor: f64,
        exploration_rate: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    }

    #[derive(Serialize)]
    struct TrainingSection {
        episodes: usize,
        successes: usize,
        success_rate: f64,
        average_steps: f64,
        states_explored: usize,
        max_value: f64,
    }

    #[derive(Serialize)]
    struct EvaluationSection {
        episodes: usize,
        successes: usize,
        success_rate: f64,
        mean_steps: f64,
        std_dev_steps: f64,
        min_steps: f64,
        max_steps: f64,
    }

    let export = EvaluationExport {
        configuration: ConfigurationSection {
            maze_size: args.maze_size,
            wall_density: args.wall_density,
            learning_rate: args.learning_rate,
            discount_factor: args.discount_factor,
            exploration_rate: args.exploration_rate,
            seed: args.seed,
        },
        training: TrainingSection {
            episodes: training.episodes,
            successes: training.successes,
            success_rate: training.success_rate,
            average_steps: training.average_steps,
            states_explored: training.states_explored,
            max_value: training.max_value,
        },
        evaluation: EvaluationSection {
            episodes: evaluation.episodes,
            successes: evaluation.successes,
            success_rate: evaluation.success_rate,
            mean_steps: evaluation.mean_steps,
            std_dev_steps: evaluation.std_dev_steps,
            min_steps: evaluation.min_steps,
            max_steps: evaluation.max_steps,
        },
    };

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &export)?;
    Ok(())
}
