//! CLI infrastructure for the maze training toolkit
//!
//! This module provides the command-line interface for training and
//! evaluating maze navigation agents.

pub mod commands;
pub mod output;
