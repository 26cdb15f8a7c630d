//! Q-table implementation for tabular temporal difference learning

use std::collections::{BTreeMap, HashMap};
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::types::{Action, Position};

/// Value estimates for the four actions of one state, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionValues([f64; 4]);

impl ActionValues {
    /// Highest stored value.
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest value. Ties break toward the first action in
    /// declared order, so a fresh all-zero state yields `Action::Up`.
    pub fn greedy(&self) -> Action {
        let mut best = Action::Up;
        for action in Action::ALL {
            if self.0[action.index()] > self.0[best.index()] {
                best = action;
            }
        }
        best
    }

    /// Values in action declaration order.
    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }
}

impl Index<Action> for ActionValues {
    type Output = f64;

    fn index(&self, action: Action) -> &f64 {
        &self.0[action.index()]
    }
}

impl IndexMut<Action> for ActionValues {
    fn index_mut(&mut self, action: Action) -> &mut f64 {
        &mut self.0[action.index()]
    }
}

/// Q-table mapping grid positions to per-action value estimates
///
/// States are created lazily: selecting an action or applying an update
/// initializes all four action values of an unseen state to 0.0 in one step,
/// so an entry is never partially populated. Read-only lookups never create
/// entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    values: HashMap<Position, ActionValues>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a new empty Q-table. Parameter ranges are enforced by the
    /// agent, not here.
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    /// Initialize a state's four action values to 0.0 if unseen.
    pub fn touch(&mut self, state: Position) {
        self.values.entry(state).or_default();
    }

    /// Stored values for a state, without initializing unseen states.
    pub fn action_values(&self, state: Position) -> Option<ActionValues> {
        self.values.get(&state).copied()
    }

    /// Greedy action for a state, initializing it when unseen.
    pub fn greedy_action(&mut self, state: Position) -> Action {
        self.touch(state);
        self.values[&state].greedy()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Initializes both states when unseen. This is the only place stored
    /// values change.
    pub fn q_learning_update(
        &mut self,
        state: Position,
        action: Action,
        reward: f64,
        next_state: Position,
    ) {
        self.touch(state);
        self.touch(next_state);

        let current_q = self.values[&state][action];
        let max_next_q = self.values[&next_state].max();
        let td_target = reward + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.values.entry(state).or_default()[action] = new_q;
    }

    /// Number of distinct states in the table.
    pub fn states_explored(&self) -> usize {
        self.values.len()
    }

    /// Total stored action values, always a multiple of four.
    pub fn total_values(&self) -> usize {
        self.values.len() * Action::COUNT
    }

    /// Highest value anywhere in the table, 0.0 when empty.
    pub fn max_value(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values
            .values()
            .map(ActionValues::max)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Snapshot of the table ordered by position.
    pub fn export(&self) -> BTreeMap<Position, ActionValues> {
        self.values.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Remove every entry. Learning parameters are untouched.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    pub(crate) fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub(crate) fn set_discount_factor(&mut self, discount_factor: f64) {
        self.discount_factor = discount_factor;
    }
}
