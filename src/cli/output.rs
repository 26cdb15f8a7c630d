//! Output formatting and progress bars for CLI

use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{maze::Maze, types::Position};

/// Create a spinner for generation tasks
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Render a maze as ASCII with start, goal, and a path marked
///
/// `S` marks the start, `G` the goal, `*` cells on the path, `#` walls, and
/// `.` open cells. An empty path renders the bare maze.
pub fn render_maze(maze: &Maze, path: &[Position]) -> String {
    let on_path: HashSet<Position> = path.iter().copied().collect();
    let mut rows = Vec::with_capacity(maze.size());

    for y in 0..maze.size() {
        let mut row = String::with_capacity(maze.size());
        for x in 0..maze.size() {
            let position = Position::new(x, y);
            let mark = if position == maze.start() {
                'S'
            } else if position == maze.goal() {
                'G'
            } else if on_path.contains(&position) {
                '*'
            } else if maze.is_wall(x, y) {
                '#'
            } else {
                '.'
            };
            row.push(mark);
        }
        rows.push(row);
    }

    rows.join("\n")
}
