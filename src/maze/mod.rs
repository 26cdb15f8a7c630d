//! Maze generation and grid queries
//!
//! A maze is a square grid of open and walled cells with a fixed start at
//! `(0, 0)` and goal at `(size - 1, size - 1)`. Generation carves corridors
//! with a randomized depth-first backtracker, then applies probabilistic
//! relaxation and connectivity passes tuned by [`GeneratorConfig`], and
//! finally verifies (repairing if necessary) that the goal is reachable.
//!
//! ## Usage Example
//!
//! ```no_run
//! use qmaze::maze::{GeneratorConfig, MazeGenerator};
//!
//! let config = GeneratorConfig::new(15, 0.3)?;
//! let maze = MazeGenerator::new(config)?.with_seed(42).generate()?;
//! assert!(maze.is_solvable());
//! # Ok::<(), qmaze::Error>(())
//! ```

pub mod generator;
pub mod grid;

// Public re-exports
pub use generator::{GeneratorConfig, MazeGenerator, generate};
pub use grid::{Cell, Maze};
