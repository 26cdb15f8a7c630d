//! Maze Q-learning CLI
//!
//! This CLI provides a unified interface for:
//! - Training a tabular Q-learning agent on generated mazes
//! - Evaluating learned policies with exploration frozen
//! - Generating mazes and inspecting their structure

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qmaze")]
#[command(version, about = "Q-learning on procedurally generated mazes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-learning agent on a generated maze
    Train(qmaze::cli::commands::train::TrainArgs),

    /// Train an agent, then evaluate its greedy policy
    Evaluate(qmaze::cli::commands::evaluate::EvaluateArgs),

    /// Generate mazes and print their structure
    Maze(qmaze::cli::commands::maze::MazeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => qmaze::cli::commands::train::execute(args),
        Commands::Evaluate(args) => qmaze::cli::commands::evaluate::execute(args),
        Commands::Maze(args) => qmaze::cli::commands::maze::execute(args),
    }
}
