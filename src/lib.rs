//! adaptive-engine - In-process learning engine for decision support
//!
//! Records (context, decision, outcome) experiences and learns from them.
//!
//! # Architecture
//!
//! - **memory**: experience log, pattern miner, knowledge graph
//! - **learning**: value table with epsilon-greedy selection, outcome forecasts
//! - **events**: synchronous publish/subscribe for learning events
//! - **engine**: the `AdaptiveEngine` facade tying it together

pub mod errors;
pub mod memory;
pub mod learning;
pub mod events;
pub mod engine;

// Re-export commonly used types
pub use errors::{EngineError, Result};
pub use engine::{ActionValue, AdaptiveEngine, GraphExport, KnowledgeExport, Statistics};
pub use events::{EventKind, LearningEvent, SubscriptionId};
pub use learning::{PredictedOutcome, PredictionResult, StateKey};
pub use memory::types::{Context, Decision, Experience, ExperienceId, Metadata, NewExperience, Outcome};

// Configuration, logging and the command-line surface
pub mod config;
pub mod telemetry;
pub mod cli;
