//! Command-line argument parsing for the adaptive engine tool
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// adaptive-engine - Replay experiences and query the learning engine
#[derive(Parser, Debug)]
#[command(name = "adaptive-engine")]
#[command(version)]
#[command(about = "Record task experiences and ask what to do next", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Context given on the command line
#[derive(ClapArgs, Debug, Clone)]
pub struct ContextArgs {
    /// Task category
    #[arg(long)]
    pub task: String,

    /// Task complexity (1-10)
    #[arg(long, default_value_t = 5)]
    pub complexity: u8,

    /// Requirement label (repeatable)
    #[arg(long = "requirement", value_name = "REQ")]
    pub requirements: Vec<String>,

    /// Experiences (JSON lines) to learn from before answering
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record every experience in a JSON-lines file and print statistics
    Replay {
        /// JSON-lines file of experiences
        file: PathBuf,
    },

    /// Recommend an action for a context
    Recommend {
        #[command(flatten)]
        context: ContextArgs,

        /// Candidate action (repeatable)
        #[arg(long = "action", value_name = "ACTION", required = true)]
        actions: Vec<String>,
    },

    /// Forecast the outcome of a decision
    Predict {
        #[command(flatten)]
        context: ContextArgs,

        /// Decision to evaluate
        #[arg(long)]
        decision: String,
    },

    /// Print the learned knowledge as JSON
    Export {
        /// Experiences (JSON lines) to learn from first
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Log filter directive, or `None` to keep the configured level
    pub fn log_level(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("error"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("debug"),
            Verbosity::VeryVerbose => Some("trace"),
        }
    }

    /// Check if should print discovered patterns as they happen
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
