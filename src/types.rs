//! Core types shared across the maze and learning components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default per-episode step budget.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// A cell coordinate on the grid.
///
/// Doubles as the state key of the value table, so it hashes and orders
/// structurally. Bounds are enforced by the grid, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A directional move on the grid.
///
/// The declared order is the tie-break order for greedy action selection and
/// the slot order of [`ActionValues`](crate::q_learning::ActionValues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    /// All actions, in tie-break order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Number of actions.
    pub const COUNT: usize = 4;

    /// Unit offset of the move as `(dx, dy)`, with y growing downward.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Action::Up => (0, -1),
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
        }
    }

    /// Position reached by taking this move from `position` on a `size` grid,
    /// or `None` when the move leaves the grid.
    #[must_use]
    pub fn apply(self, position: Position, size: usize) -> Option<Position> {
        let (dx, dy) = self.offset();
        let x = position.x.checked_add_signed(dx)?;
        let y = position.y.checked_add_signed(dy)?;
        if x < size && y < size {
            Some(Position::new(x, y))
        } else {
            None
        }
    }

    /// Slot of this action in a fixed-size value array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Right => 1,
            Action::Down => 2,
            Action::Left => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reward values applied during an episode.
pub mod reward {
    /// Penalty for a move that leaves the grid or hits a wall.
    pub const INVALID_MOVE: f64 = -10.0;

    /// Reward for stepping onto the goal cell.
    pub const GOAL: f64 = 100.0;

    /// Cost of every other step.
    pub const STEP: f64 = -1.0;
}
