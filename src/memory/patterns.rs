//! Pattern Miner: recurring (task, decision) detection
//!
//! Keeps a running tally per signature. A [`Pattern`] is materialised the
//! first time a signature reaches the discovery threshold and is updated in
//! place afterwards.

use crate::memory::types::Experience;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Occurrences needed before a signature becomes a pattern
pub const DEFAULT_DISCOVERY_THRESHOLD: u64 = 3;

/// Task plus chosen decision
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternSignature {
    pub task: String,
    pub decision: String,
}

impl PatternSignature {
    pub fn new(task: impl Into<String>, decision: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            decision: decision.into(),
        }
    }

    pub fn from_experience(experience: &Experience) -> Self {
        Self::new(&experience.context.task, &experience.decision.chosen)
    }
}

impl fmt::Display for PatternSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.task, self.decision)
    }
}

/// Surfaced success pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub signature: PatternSignature,
    pub occurrences: u64,
    /// Fraction of successful outcomes (0.0-1.0)
    pub success_rate: f64,
    /// Mean outcome quality (0-100)
    pub average_quality: f64,
    pub last_seen: DateTime<Utc>,
    pub discovered_at: DateTime<Utc>,
}

impl Pattern {
    /// Human-readable recommendation text
    pub fn description(&self) -> String {
        format!(
            "Use '{}' for '{}': {:.0}% success over {} runs (avg quality {:.1})",
            self.signature.decision,
            self.signature.task,
            self.success_rate * 100.0,
            self.occurrences,
            self.average_quality,
        )
    }
}

/// Running counts for one signature
#[derive(Debug, Clone)]
struct Tally {
    occurrences: u64,
    successes: u64,
    quality_sum: f64,
    last_seen: DateTime<Utc>,
}

impl Tally {
    fn new(seen: DateTime<Utc>) -> Self {
        Self {
            occurrences: 0,
            successes: 0,
            quality_sum: 0.0,
            last_seen: seen,
        }
    }

    fn success_rate(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.successes as f64 / self.occurrences as f64
        }
    }

    fn average_quality(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.quality_sum / self.occurrences as f64
        }
    }
}

/// Pattern miner over recorded experiences
#[derive(Debug)]
pub struct PatternMiner {
    threshold: u64,
    tallies: HashMap<PatternSignature, Tally>,
    patterns: HashMap<PatternSignature, Pattern>,
}

impl PatternMiner {
    /// Create a miner with the given discovery threshold (minimum 1)
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold: threshold.max(1),
            tallies: HashMap::new(),
            patterns: HashMap::new(),
        }
    }

    /// Fold an experience into the tallies
    ///
    /// Returns the pattern only on the call that first reaches the threshold.
    pub fn observe(&mut self, experience: &Experience) -> Option<Pattern> {
        let signature = PatternSignature::from_experience(experience);
        let tally = self
            .tallies
            .entry(signature.clone())
            .or_insert_with(|| Tally::new(experience.recorded_at));

        tally.occurrences += 1;
        if experience.outcome.success {
            tally.successes += 1;
        }
        tally.quality_sum += experience.outcome.quality;
        tally.last_seen = experience.recorded_at;

        if let Some(pattern) = self.patterns.get_mut(&signature) {
            pattern.occurrences = tally.occurrences;
            pattern.success_rate = tally.success_rate();
            pattern.average_quality = tally.average_quality();
            pattern.last_seen = tally.last_seen;
            return None;
        }

        if tally.occurrences < self.threshold {
            return None;
        }

        let pattern = Pattern {
            signature: signature.clone(),
            occurrences: tally.occurrences,
            success_rate: tally.success_rate(),
            average_quality: tally.average_quality(),
            last_seen: tally.last_seen,
            discovered_at: Utc::now(),
        };
        self.patterns.insert(signature, pattern.clone());
        Some(pattern)
    }

    pub fn pattern(&self, signature: &PatternSignature) -> Option<&Pattern> {
        self.patterns.get(signature)
    }

    /// Patterns for a task ranked by occurrences, then success rate, then decision
    pub fn patterns_for_task(&self, task: &str, limit: usize) -> Vec<&Pattern> {
        let mut matches: Vec<&Pattern> = self
            .patterns
            .values()
            .filter(|p| p.signature.task == task)
            .collect();

        matches.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| {
                    b.success_rate
                        .partial_cmp(&a.success_rate)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.signature.decision.cmp(&b.signature.decision))
        });
        matches.truncate(limit);
        matches
    }

    /// All patterns sorted by signature
    pub fn patterns(&self) -> Vec<Pattern> {
        let mut all: Vec<Pattern> = self.patterns.values().cloned().collect();
        all.sort_by(|a, b| a.signature.cmp(&b.signature));
        all
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Occurrences seen so far for a signature, discovered or not
    pub fn occurrences(&self, signature: &PatternSignature) -> u64 {
        self.tallies.get(signature).map_or(0, |t| t.occurrences)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn clear(&mut self) {
        self.tallies.clear();
        self.patterns.clear();
    }
}

impl Default for PatternMiner {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOVERY_THRESHOLD)
    }
}
