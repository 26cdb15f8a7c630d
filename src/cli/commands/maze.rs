//! Maze command - Generate mazes and print their structure

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{create_spinner, print_kv, render_maze},
    maze::{GeneratorConfig, MazeGenerator},
};

#[derive(Parser, Debug)]
#[command(about = "Generate mazes and print their structure")]
pub struct MazeArgs {
    /// Maze edge length
    #[arg(long, short = 's', default_value_t = 15)]
    pub size: usize,

    /// Wall density (0.0-1.0)
    #[arg(long, short = 'd', default_value_t = 0.3)]
    pub density: f64,

    /// Number of mazes to generate
    #[arg(long, short = 'c', default_value_t = 1)]
    pub count: usize,

    /// Random seed; maze i is generated from seed + i
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: MazeArgs) -> Result<()> {
    let spinner = create_spinner("Generating mazes...");
    let mut mazes = Vec::with_capacity(args.count);
    for index in 0..args.count {
        let config = GeneratorConfig::new(args.size, args.density)?;
        let mut generator = MazeGenerator::new(config)?;
        if let Some(seed) = args.seed {
            generator = generator.with_seed(seed.wrapping_add(index as u64));
        }
        mazes.push(generator.generate()?);
    }
    spinner.finish_and_clear();

    for (index, maze) in mazes.iter().enumerate() {
        if args.count > 1 {
            println!("\n=== Maze {} ===", index + 1);
        }
        println!("{}", render_maze(maze, &[]));

        let total = maze.size() * maze.size();
        let open = maze.open_cells();
        let wall_share = (total - open) as f64 / total as f64;
        print_kv("Open cells", &format!("{open}/{total}"));
        print_kv("Wall share", &format!("{:.1}%", wall_share * 100.0));
        match maze.shortest_path_len() {
            Some(length) => print_kv("Shortest path", &format!("{length} steps")),
            None => print_kv("Shortest path", "unreachable"),
        }
    }

    Ok(())
}
