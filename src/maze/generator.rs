//! Procedural maze generation with a reachability guarantee

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::maze::grid::{Maze, validate_size};
use crate::types::{Action, Position};

/// Tunable parameters for maze generation.
///
/// `size` and `wall_density` shape the maze; the remaining fields tune the
/// probabilistic relaxation and connectivity passes and rarely need changing.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Grid edge length, at least 2.
    pub size: usize,
    /// Requested wall share in `[0, 1]`. Higher densities relax fewer walls.
    pub wall_density: f64,
    /// Lower bound on the relaxation probability.
    pub relaxation_floor: f64,
    /// Scale applied to `1 - wall_density` when relaxing walls.
    pub relaxation_scale: f64,
    /// A wall only relaxes while it has fewer open neighbors than this.
    pub max_open_neighbors: usize,
    /// Fraction of `size` used as the connectivity boost cell count.
    pub boost_fraction: f64,
    /// Chebyshev radius around start and goal that relaxation leaves alone.
    pub protected_radius: usize,
}

impl GeneratorConfig {
    /// Creates a validated configuration with default tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is below 2 or `wall_density` lies outside
    /// `[0, 1]`.
    pub fn new(size: usize, wall_density: f64) -> Result<Self> {
        let config = GeneratorConfig {
            size,
            wall_density,
            ..GeneratorConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        validate_size(self.size)?;
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(Error::InvalidConfiguration {
                message: format!("wall density must be in [0, 1], got {}", self.wall_density),
            });
        }
        if !(0.0..=1.0).contains(&self.relaxation_floor) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "relaxation floor must be in [0, 1], got {}",
                    self.relaxation_floor
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.relaxation_scale) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "relaxation scale must be in [0, 1], got {}",
                    self.relaxation_scale
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.boost_fraction) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "boost fraction must be in [0, 1], got {}",
                    self.boost_fraction
                ),
            });
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            size: 15,
            wall_density: 0.3,
            relaxation_floor: 0.1,
            relaxation_scale: 0.3,
            max_open_neighbors: 3,
            boost_fraction: 0.1,
            protected_radius: 2,
        }
    }
}

/// Maze generator combining a randomized depth-first carve with relaxation
/// and connectivity passes.
///
/// Every returned maze has an open start and goal and at least one open path
/// between them. With a seed the output is fully deterministic.
pub struct MazeGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl MazeGenerator {
    /// Creates a generator with an ambient random source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(MazeGenerator {
            config,
            rng: build_rng(None),
        })
    }

    /// Replaces the random source with a seeded one for reproducible mazes.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self
    }

    /// Generates one maze.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disconnected`] if start and goal remain unconnected
    /// after the repair pass. The repair carves a fully open path, so this is
    /// unreachable in practice, but it is checked rather than assumed.
    pub fn generate(&mut self) -> Result<Maze> {
        let mut maze = Maze::solid(self.config.size);

        self.carve_corridors(&mut maze);
        self.relax_walls(&mut maze);

        let start = maze.start();
        let goal = maze.goal();
        maze.set_open(start.x, start.y);
        maze.set_open(goal.x, goal.y);

        self.boost_connectivity(&mut maze);

        if !maze.is_solvable() {
            carve_fallback_path(&mut maze);
            if !maze.is_solvable() {
                return Err(Error::Disconnected {
                    size: self.config.size,
                });
            }
        }
        Ok(maze)
    }

    /// Randomized depth-first backtracker over a two-cell lattice.
    ///
    /// Moves jump two cells at a time so the cell between the current
    /// position and the chosen neighbor becomes the removed wall. An explicit
    /// stack replaces recursion; popping backtracks.
    fn carve_corridors(&mut self, maze: &mut Maze) {
        let size = self.config.size;
        let mut visited = vec![false; size * size];
        let mut stack = vec![maze.start()];

        visited[0] = true;
        maze.set_open(0, 0);

        while let Some(&current) = stack.last() {
            let frontier: Vec<(Position, Position)> = Action::ALL
                .iter()
                .filter_map(|action| jump(current, *action, size))
                .filter(|(_, next)| !visited[next.x + next.y * size])
                .collect();

            if let Some(&(between, next)) = frontier.choose(&mut self.rng) {
                maze.set_open(between.x, between.y);
                maze.set_open(next.x, next.y);
                visited[next.x + next.y * size] = true;
                stack.push(next);
            } else {
                stack.pop();
            }
        }
    }

    /// Probabilistically opens interior walls to reach the requested density.
    ///
    /// Cells within the protected radius of start or goal, and cells that
    /// already border `max_open_neighbors` open cells, are left walled so the
    /// corridor structure survives.
    fn relax_walls(&mut self, maze: &mut Maze) {
        let size = self.config.size;
        let probability = self
            .config
            .relaxation_floor
            .max((1.0 - self.config.wall_density) * self.config.relaxation_scale);

        for y in 1..size.saturating_sub(1) {
            for x in 1..size.saturating_sub(1) {
                let position = Position::new(x, y);
                if maze.is_open(x, y) || self.near_endpoint(position, maze) {
                    continue;
                }
                if open_neighbors(maze, position) < self.config.max_open_neighbors
                    && self.rng.random::<f64>() < probability
                {
                    maze.set_open(x, y);
                }
            }
        }
    }

    /// Opens a handful of interior walls that already border open corridors,
    /// adding alternative routes without dissolving the maze.
    fn boost_connectivity(&mut self, maze: &mut Maze) {
        let size = self.config.size;
        let candidates: Vec<Position> = (1..size.saturating_sub(1))
            .flat_map(|y| (1..size.saturating_sub(1)).map(move |x| Position::new(x, y)))
            .filter(|p| maze.is_wall(p.x, p.y) && open_neighbors(maze, *p) >= 2)
            .collect();

        let count = (size as f64 * self.config.boost_fraction).round() as usize;
        let picks: Vec<Position> = candidates
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        for position in picks {
            maze.set_open(position.x, position.y);
        }
    }

    fn near_endpoint(&self, position: Position, maze: &Maze) -> bool {
        let radius = self.config.protected_radius;
        [maze.start(), maze.goal()].into_iter().any(|endpoint| {
            position.x.abs_diff(endpoint.x) <= radius && position.y.abs_diff(endpoint.y) <= radius
        })
    }
}

/// Generates a maze in one call.
///
/// # Errors
///
/// Returns an error on invalid parameters or (in principle) a failed repair.
pub fn generate(size: usize, wall_density: f64, seed: Option<u64>) -> Result<Maze> {
    let mut generator = MazeGenerator::new(GeneratorConfig::new(size, wall_density)?)?;
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }
    generator.generate()
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Two cells in `action`'s direction from `position`, as
/// `(between, destination)`, or `None` when the jump leaves the grid.
fn jump(position: Position, action: Action, size: usize) -> Option<(Position, Position)> {
    let between = action.apply(position, size)?;
    let destination = action.apply(between, size)?;
    Some((between, destination))
}

fn open_neighbors(maze: &Maze, position: Position) -> usize {
    Action::ALL
        .iter()
        .filter(|action| {
            action
                .apply(position, maze.size())
                .is_some_and(|next| maze.is_open(next.x, next.y))
        })
        .count()
}

/// Carves an L-shaped open path along the start row and the goal column.
/// Restores connectivity when the probabilistic passes severed it.
fn carve_fallback_path(maze: &mut Maze) {
    let start = maze.start();
    let goal = maze.goal();
    for x in start.x..=goal.x {
        maze.set_open(x, start.y);
    }
    for y in start.y..=goal.y {
        maze.set_open(goal.x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_maze_solvable() {
        let maze = generate(15, 0.3, Some(42)).unwrap();
        assert_eq!(maze.size(), 15);
        assert!(maze.is_open(0, 0));
        assert!(maze.is_open(14, 14));
        assert!(maze.is_solvable());
    }

    #[test]
    fn test_same_seed_reproduces_maze() {
        let first = generate(10, 0.2, Some(99)).unwrap();
        let second = generate(10, 0.2, Some(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let first = generate(10, 0.2, Some(11111)).unwrap();
        let second = generate(10, 0.2, Some(22222)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_smallest_maze_connects() {
        let maze = generate(2, 1.0, Some(7)).unwrap();
        assert!(maze.is_open(0, 0));
        assert!(maze.is_open(1, 1));
        assert!(maze.is_solvable());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(generate(1, 0.3, None).is_err());
        assert!(generate(10, -0.1, None).is_err());
        assert!(generate(10, 1.5, None).is_err());
    }

    #[test]
    fn test_config_rejects_bad_tuning() {
        let mut config = GeneratorConfig::new(10, 0.3).unwrap();
        config.relaxation_floor = 1.2;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::new(10, 0.3).unwrap();
        config.boost_fraction = -0.5;
        assert!(config.validate().is_err());
    }
}
