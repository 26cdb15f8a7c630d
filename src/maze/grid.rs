//! Grid representation and reachability queries

use std::collections::VecDeque;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Action, Position};

/// Classification of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Open,
    Wall,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Open => '.',
            Cell::Wall => '#',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | ' ' => Some(Cell::Open),
            '#' => Some(Cell::Wall),
            _ => None,
        }
    }
}

/// An immutable square maze with a fixed start and goal.
///
/// Cells are stored in a flat vector addressed `x + y * size`. The start is
/// always `(0, 0)` and the goal `(size - 1, size - 1)`. Out-of-bounds
/// coordinates classify as walls, so callers can probe moves without a
/// separate bounds check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    size: usize,
    cells: Vec<Cell>,
    start: Position,
    goal: Position,
}

impl Maze {
    /// Creates a maze with every cell walled. Used as the generator's canvas.
    pub(crate) fn solid(size: usize) -> Self {
        Maze {
            size,
            cells: vec![Cell::Wall; size * size],
            start: Position::new(0, 0),
            goal: Position::new(size - 1, size - 1),
        }
    }

    /// Creates a fully open maze of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is less than 2.
    pub fn open(size: usize) -> Result<Self> {
        validate_size(size)?;
        Ok(Maze {
            size,
            cells: vec![Cell::Open; size * size],
            start: Position::new(0, 0),
            goal: Position::new(size - 1, size - 1),
        })
    }

    /// Parses a maze from rows of `#` (wall) and `.` (open) characters.
    ///
    /// The row count must equal every row's length, and the start and goal
    /// corners must be open.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-square layout, a size below 2, an unknown
    /// character, or a walled start or goal.
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let size = rows.len();
        validate_size(size)?;

        let mut maze = Maze::solid(size);
        for (y, row) in rows.iter().enumerate() {
            let row: Vec<char> = row.chars().collect();
            if row.len() != size {
                return Err(Error::InvalidMazeShape {
                    message: format!("row {} has {} cells, expected {}", y, row.len(), size),
                });
            }
            for (x, &c) in row.iter().enumerate() {
                match Cell::from_char(c) {
                    Some(Cell::Open) => maze.set_open(x, y),
                    Some(Cell::Wall) => {}
                    None => return Err(Error::InvalidCellCharacter { character: c, x, y }),
                }
            }
        }

        for corner in [maze.start, maze.goal] {
            if maze.is_wall(corner.x, corner.y) {
                return Err(Error::InvalidConfiguration {
                    message: format!("cell {corner} must be open"),
                });
            }
        }
        Ok(maze)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.size
    }

    pub(crate) fn set_open(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        self.cells[index] = Cell::Open;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Whether the cell is a wall. Out-of-bounds coordinates count as walls.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        if x >= self.size || y >= self.size {
            return true;
        }
        self.cells[self.index(x, y)] == Cell::Wall
    }

    pub fn is_open(&self, x: usize, y: usize) -> bool {
        !self.is_wall(x, y)
    }

    pub fn is_goal(&self, x: usize, y: usize) -> bool {
        self.goal.x == x && self.goal.y == y
    }

    /// Number of open cells.
    pub fn open_cells(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Open).count()
    }

    /// Length in steps of the shortest open path from start to goal, or
    /// `None` when the goal is unreachable. Breadth-first search over open
    /// cells with 4-directional adjacency.
    pub fn shortest_path_len(&self) -> Option<usize> {
        if self.is_wall(self.start.x, self.start.y) {
            return None;
        }

        let mut distance = vec![usize::MAX; self.size * self.size];
        let mut queue = VecDeque::new();
        distance[self.index(self.start.x, self.start.y)] = 0;
        queue.push_back(self.start);

        while let Some(position) = queue.pop_front() {
            let steps = distance[self.index(position.x, position.y)];
            if position == self.goal {
                return Some(steps);
            }
            for action in Action::ALL {
                if let Some(next) = action.apply(position, self.size)
                    && self.is_open(next.x, next.y)
                    && distance[self.index(next.x, next.y)] == usize::MAX
                {
                    distance[self.index(next.x, next.y)] = steps + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    pub fn is_solvable(&self) -> bool {
        self.shortest_path_len().is_some()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                write!(f, "{}", self.cells[self.index(x, y)].to_char())?;
            }
            if y + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_size(size: usize) -> Result<()> {
    if size < 2 {
        return Err(Error::InvalidConfiguration {
            message: format!("maze size must be at least 2, got {size}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_maze_has_no_walls() {
        let maze = Maze::open(4).unwrap();
        assert_eq!(maze.open_cells(), 16);
        assert!(!maze.is_wall(0, 0));
        assert!(!maze.is_wall(3, 3));
    }

    #[test]
    fn test_size_below_two_rejected() {
        assert!(Maze::open(1).is_err());
        assert!(Maze::open(0).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let maze = Maze::open(3).unwrap();
        assert!(maze.is_wall(3, 0));
        assert!(maze.is_wall(0, 3));
        assert!(maze.is_wall(100, 100));
    }

    #[test]
    fn test_parse_walls_and_corners() {
        let maze = Maze::parse(&[".#.", "...", "#.."]).unwrap();
        assert!(maze.is_wall(1, 0));
        assert!(maze.is_wall(0, 2));
        assert!(maze.is_open(1, 1));
        assert_eq!(maze.start(), Position::new(0, 0));
        assert_eq!(maze.goal(), Position::new(2, 2));
        assert!(maze.is_goal(2, 2));
        assert!(!maze.is_goal(0, 0));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        assert!(Maze::parse(&["..", "...", "..."]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_characters() {
        assert!(Maze::parse(&["..", ".x"]).is_err());
    }

    #[test]
    fn test_parse_rejects_walled_corners() {
        assert!(Maze::parse(&["#.", ".."]).is_err());
        assert!(Maze::parse(&["..", ".#"]).is_err());
    }

    #[test]
    fn test_shortest_path_open_grid() {
        let maze = Maze::open(5).unwrap();
        assert_eq!(maze.shortest_path_len(), Some(8));
    }

    #[test]
    fn test_shortest_path_detours() {
        let maze = Maze::parse(&["..#", ".##", "..."]).unwrap();
        assert_eq!(maze.shortest_path_len(), Some(4));
    }

    #[test]
    fn test_severed_maze_unsolvable() {
        let maze = Maze::parse(&[".#.", "###", ".#."]).unwrap();
        assert!(!maze.is_solvable());
        assert_eq!(maze.shortest_path_len(), None);
    }

    #[test]
    fn test_display_renders_rows() {
        let maze = Maze::parse(&["..", ".."]).unwrap();
        assert_eq!(maze.to_string(), "..\n..");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let rows = [".#.", "...", "#.."];
        let maze = Maze::parse(&rows).unwrap();
        assert_eq!(maze.to_string(), rows.join("\n"));
    }
}
