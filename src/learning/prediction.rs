//! Prediction Engine: outcome forecasts for hypothetical decisions
//!
//! Reads the value table and the mined patterns; owns no state of its own.

use crate::errors::{EngineError, Result};
use crate::learning::qlearner::QLearner;
use crate::learning::state::StateKey;
use crate::memory::patterns::{PatternMiner, PatternSignature};
use crate::memory::types::Context;
use serde::{Deserialize, Serialize};

/// Default number of pattern recommendations attached to a forecast
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 3;

/// Visits needed for full confidence
const CONFIDENCE_SATURATION_VISITS: f64 = 10.0;

/// Lower end of the reward range, mapped onto 0
const REWARD_FLOOR: f64 = -0.1;

/// Forecast outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedOutcome {
    /// Estimated success probability (0.0-1.0)
    pub success: f64,
}

/// Forecast with confidence and pattern recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_outcome: PredictedOutcome,
    /// Confidence (0.0-1.0), grows with visits to the state/action pair
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

impl PredictionResult {
    /// Neutral prior for pairs never seen before
    pub fn neutral() -> Self {
        Self {
            predicted_outcome: PredictedOutcome { success: 0.5 },
            confidence: 0.0,
            recommendations: Vec::new(),
        }
    }
}

/// Stateless forecaster over learner and miner state
#[derive(Debug, Clone, Copy)]
pub struct PredictionEngine {
    max_recommendations: usize,
}

impl PredictionEngine {
    pub fn new(max_recommendations: usize) -> Self {
        Self { max_recommendations }
    }

    /// Forecast the outcome of taking `decision` in `context`
    ///
    /// The value-table estimate is `clamp(q + 0.1, 0, 1)`. Once the
    /// (task, decision) signature has been surfaced as a pattern, the estimate
    /// is averaged with the pattern's observed success rate.
    pub fn predict(
        &self,
        learner: &QLearner,
        miner: &PatternMiner,
        context: &Context,
        decision: &str,
    ) -> Result<PredictionResult> {
        if decision.trim().is_empty() {
            return Err(EngineError::EmptyActionSet);
        }

        let state_key = StateKey::from_context(context);
        let entry = match learner.entry(&state_key, decision) {
            Some(entry) => entry,
            None => return Ok(PredictionResult::neutral()),
        };

        let value_estimate = (entry.q_value - REWARD_FLOOR).clamp(0.0, 1.0);
        let signature = PatternSignature::new(&context.task, decision);
        let success = match miner.pattern(&signature) {
            Some(pattern) => (value_estimate + pattern.success_rate) / 2.0,
            None => value_estimate,
        };

        let confidence = (entry.visit_count as f64 / CONFIDENCE_SATURATION_VISITS).min(1.0);

        let recommendations = miner
            .patterns_for_task(&context.task, self.max_recommendations)
            .into_iter()
            .map(|p| p.description())
            .collect();

        Ok(PredictionResult {
            predicted_outcome: PredictedOutcome {
                success: success.clamp(0.0, 1.0),
            },
            confidence,
            recommendations,
        })
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECOMMENDATIONS)
    }
}
