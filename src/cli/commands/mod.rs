//! CLI command implementations

pub mod evaluate;
pub mod maze;
pub mod train;
