//! Q-Learner: tabular action values with epsilon-greedy selection
//!
//! Every experience is a one-shot task, so the update is the single-step
//! bandit rule `q <- q + alpha * (reward - q)` with no discount factor and no
//! next-state bootstrap.

use crate::errors::{EngineError, Result};
use crate::learning::state::StateKey;
use crate::memory::types::Outcome;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Execution time at which the time penalty saturates
const TIME_PENALTY_HORIZON_MS: f64 = 5000.0;

/// Reward for an outcome, roughly within [-0.1, 0.9]
pub fn reward(outcome: &Outcome) -> f64 {
    let success = if outcome.success { 1.0 } else { 0.0 };
    let time_penalty = (outcome.execution_time_ms / TIME_PENALTY_HORIZON_MS).min(1.0);
    0.5 * success + 0.4 * (outcome.quality / 100.0) - 0.1 * time_penalty
}

/// One (state, action) cell of the value table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableEntry {
    pub state_key: StateKey,
    pub action: String,
    pub q_value: f64,
    pub visit_count: u64,
}

/// Result of a single value update
#[derive(Debug, Clone, PartialEq)]
pub struct QUpdate {
    pub state_key: StateKey,
    pub action: String,
    pub reward: f64,
    pub previous_q: f64,
    pub q_value: f64,
    pub visit_count: u64,
}

/// Value table plus selection policy
#[derive(Debug)]
pub struct QLearner {
    /// Learning rate, (0, 1]
    alpha: f64,
    /// Exploration rate, [0, 1]
    epsilon: f64,
    table: HashMap<StateKey, HashMap<String, QTableEntry>>,
    entry_count: usize,
}

impl QLearner {
    /// Create a learner with `alpha` in (0, 1] and `epsilon` in [0, 1]
    pub fn new(alpha: f64, epsilon: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(EngineError::validation("learning_rate", format!("must be in (0, 1], got {}", alpha)));
        }
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(EngineError::validation(
                "exploration_rate",
                format!("must be in [0, 1], got {}", epsilon),
            ));
        }

        Ok(Self {
            alpha,
            epsilon,
            table: HashMap::new(),
            entry_count: 0,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.alpha
    }

    pub fn exploration_rate(&self) -> f64 {
        self.epsilon
    }

    /// Compute the updated value without touching the table
    ///
    /// Panics if the reward or the new value is not finite: writing such a
    /// value would corrupt every later decision for this state.
    pub fn plan_update(&self, state_key: &StateKey, action: &str, outcome: &Outcome) -> QUpdate {
        let reward = reward(outcome);
        assert!(reward.is_finite(), "non-finite reward {reward} for {state_key}/{action}");

        let (previous_q, visits) = self
            .entry(state_key, action)
            .map_or((0.0, 0), |e| (e.q_value, e.visit_count));
        let q_value = previous_q + self.alpha * (reward - previous_q);
        assert!(q_value.is_finite(), "non-finite q-value {q_value} for {state_key}/{action}");

        QUpdate {
            state_key: state_key.clone(),
            action: action.to_string(),
            reward,
            previous_q,
            q_value,
            visit_count: visits + 1,
        }
    }

    /// Write a planned update into the table
    pub fn commit(&mut self, update: &QUpdate) {
        let actions = self.table.entry(update.state_key.clone()).or_default();
        if !actions.contains_key(&update.action) {
            self.entry_count += 1;
        }
        let entry = actions
            .entry(update.action.clone())
            .or_insert_with(|| QTableEntry {
                state_key: update.state_key.clone(),
                action: update.action.clone(),
                q_value: 0.0,
                visit_count: 0,
            });
        entry.q_value = update.q_value;
        entry.visit_count = update.visit_count;
    }

    /// Plan and commit in one step
    pub fn update(&mut self, state_key: &StateKey, action: &str, outcome: &Outcome) -> QUpdate {
        let update = self.plan_update(state_key, action, outcome);
        self.commit(&update);
        update
    }

    pub fn entry(&self, state_key: &StateKey, action: &str) -> Option<&QTableEntry> {
        self.table.get(state_key).and_then(|actions| actions.get(action))
    }

    /// Stored value, 0 for unseen pairs
    pub fn q_value(&self, state_key: &StateKey, action: &str) -> f64 {
        self.entry(state_key, action).map_or(0.0, |e| e.q_value)
    }

    /// Epsilon-greedy choice among `actions`
    ///
    /// Exploitation picks the highest stored value; ties go to the earliest
    /// candidate so results are reproducible.
    pub fn select_action<S, R>(&self, state_key: &StateKey, actions: &[S], rng: &mut R) -> Result<String>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if actions.is_empty() {
            return Err(EngineError::EmptyActionSet);
        }

        if rng.gen_bool(self.epsilon) {
            if let Some(choice) = actions.choose(rng) {
                return Ok(choice.as_ref().to_string());
            }
        }

        Ok(self.best_action(state_key, actions)?.to_string())
    }

    /// Greedy choice, no exploration
    pub fn best_action<'a, S: AsRef<str>>(&self, state_key: &StateKey, actions: &'a [S]) -> Result<&'a str> {
        let mut iter = actions.iter().map(|a| a.as_ref());
        let first = iter.next().ok_or(EngineError::EmptyActionSet)?;

        let mut best = (first, self.q_value(state_key, first));
        for action in iter {
            let q = self.q_value(state_key, action);
            if q > best.1 {
                best = (action, q);
            }
        }
        Ok(best.0)
    }

    /// All entries, sorted by state key then action
    pub fn entries(&self) -> Vec<QTableEntry> {
        let mut all: Vec<QTableEntry> = self
            .table
            .values()
            .flat_map(|actions| actions.values().cloned())
            .collect();
        all.sort_by(|a, b| a.state_key.cmp(&b.state_key).then_with(|| a.action.cmp(&b.action)));
        all
    }

    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.entry_count = 0;
    }
}
