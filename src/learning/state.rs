//! State keys: generalization buckets over contexts

use crate::memory::types::Context;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse complexity band shared by neighbouring complexity scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBucket {
    /// 1-3
    Low,
    /// 4-7
    Medium,
    /// 8-10
    High,
}

impl ComplexityBucket {
    /// Bucket a complexity score; out-of-range scores clamp to the nearest band
    pub fn from_complexity(complexity: u8) -> Self {
        match complexity {
            0..=3 => Self::Low,
            4..=7 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Deterministic Q-table index derived from a context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    /// Derive the key from task, complexity bucket and sorted requirements
    ///
    /// `\`, `|` and `,` inside the task or a requirement are backslash-escaped,
    /// so distinct contexts never share a key.
    pub fn from_context(context: &Context) -> Self {
        // BTreeSet iterates in sorted order
        let requirements = context
            .requirements
            .iter()
            .map(|r| escape(r))
            .collect::<Vec<_>>()
            .join(",");

        Self(format!(
            "{}|{}|{}",
            escape(&context.task),
            ComplexityBucket::from_complexity(context.complexity).as_str(),
            requirements
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if matches!(c, '\\' | '|' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
