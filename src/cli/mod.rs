//! CLI module for the adaptive engine tool
//!
//! Handles command-line argument parsing and experience file input.

pub mod args;
pub mod replay;

pub use args::{Args, Commands, ContextArgs, Verbosity};
pub use replay::{load_experiences, read_experiences};
