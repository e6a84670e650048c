//! Learning components
//!
//! - State keys: context generalization buckets
//! - Q-Learner: single-step action values and epsilon-greedy selection
//! - Prediction Engine: outcome forecasts from values and patterns

pub mod prediction;
pub mod qlearner;
pub mod state;

pub use prediction::{PredictedOutcome, PredictionEngine, PredictionResult};
pub use qlearner::{reward, QLearner, QTableEntry, QUpdate};
pub use state::{ComplexityBucket, StateKey};
