//! JSON export of the learned value table

use std::{fs::File, path::Path};

use crate::{Result, q_learning::QLearningAgent, types::Action};

/// Write the agent's value table to a JSON file
///
/// Keys are positions formatted as `"x,y"`; each entry maps action names to
/// their learned values. Returns the number of exported states.
///
/// # Errors
///
/// Returns an error when the file cannot be created or serialization fails.
pub fn write_q_table<P: AsRef<Path>>(path: P, agent: &QLearningAgent) -> Result<usize> {
    let table = agent.export_table();
    let count = table.len();

    let mut entries = serde_json::Map::new();
    for (position, values) in table {
        let key = format!("{},{}", position.x, position.y);
        entries.insert(
            key,
            serde_json::json!({
                "up": values[Action::Up],
                "right": values[Action::Right],
                "down": values[Action::Down],
                "left": values[Action::Left],
            }),
        );
    }

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &serde_json::Value::Object(entries))?;
    Ok(count)
}
