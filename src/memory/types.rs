//! Core data types for the experience log

use crate::errors::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for recorded experiences
pub type ExperienceId = uuid::Uuid;

/// Allowed task complexity range
pub const COMPLEXITY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Allowed outcome quality range
pub const QUALITY_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Situation a decision was made in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Task category, e.g. "api_development"
    pub task: String,
    /// Complexity score (1-10)
    pub complexity: u8,
    /// Requirement labels; ordering is irrelevant
    #[serde(default)]
    pub requirements: BTreeSet<String>,
}

impl Context {
    /// Create a context with no requirements
    pub fn new(task: impl Into<String>, complexity: u8) -> Self {
        Self {
            task: task.into(),
            complexity,
            requirements: BTreeSet::new(),
        }
    }

    /// Add a requirement label
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.insert(requirement.into());
        self
    }

    /// Check task and complexity
    pub fn validate(&self) -> Result<()> {
        if self.task.trim().is_empty() {
            return Err(EngineError::validation("context.task", "must not be empty"));
        }
        if !COMPLEXITY_RANGE.contains(&self.complexity) {
            return Err(EngineError::validation(
                "context.complexity",
                format!("must be within 1..=10, got {}", self.complexity),
            ));
        }
        Ok(())
    }
}

/// Choice that was made, with the alternatives that were on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub chosen: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Caller-supplied confidence (0.0-1.0), stored for inspection only
    #[serde(default)]
    pub consciousness_level: f64,
}

impl Decision {
    pub fn new(chosen: impl Into<String>) -> Self {
        Self {
            chosen: chosen.into(),
            alternatives: Vec::new(),
            consciousness_level: 0.0,
        }
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_consciousness_level(mut self, level: f64) -> Self {
        self.consciousness_level = level;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chosen.trim().is_empty() {
            return Err(EngineError::validation("decision.chosen", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.consciousness_level) {
            return Err(EngineError::validation(
                "decision.consciousness_level",
                format!("must be within 0.0..=1.0, got {}", self.consciousness_level),
            ));
        }
        Ok(())
    }
}

/// Result of acting on a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    /// Quality score (0-100)
    pub quality: f64,
    /// Wall-clock execution time in milliseconds
    pub execution_time_ms: f64,
}

impl Outcome {
    pub fn new(success: bool, quality: f64, execution_time_ms: f64) -> Self {
        Self {
            success,
            quality,
            execution_time_ms,
        }
    }

    /// Outcome class label used by the knowledge graph
    pub fn class(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "failure"
        }
    }

    pub fn validate(&self) -> Result<()> {
        // NaN fails the range check as well
        if !QUALITY_RANGE.contains(&self.quality) {
            return Err(EngineError::validation(
                "outcome.quality",
                format!("must be within 0..=100, got {}", self.quality),
            ));
        }
        if !self.execution_time_ms.is_finite() || self.execution_time_ms < 0.0 {
            return Err(EngineError::validation(
                "outcome.execution_time_ms",
                format!("must be finite and >= 0, got {}", self.execution_time_ms),
            ));
        }
        Ok(())
    }
}

/// Optional bookkeeping attached by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Experience as submitted by a caller, before an id is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExperience {
    pub context: Context,
    pub decision: Decision,
    pub outcome: Outcome,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewExperience {
    pub fn new(context: Context, decision: Decision, outcome: Outcome) -> Self {
        Self {
            context,
            decision,
            outcome,
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate every field; nothing is recorded unless this passes
    pub fn validate(&self) -> Result<()> {
        self.context.validate()?;
        self.decision.validate()?;
        self.outcome.validate()
    }
}

/// Stored, immutable experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    pub context: Context,
    pub decision: Decision,
    pub outcome: Outcome,
    pub metadata: Metadata,
    pub recorded_at: DateTime<Utc>,
}

impl Experience {
    /// Stamp a validated submission with an id and timestamp
    pub(crate) fn stamp(new: NewExperience) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            context: new.context,
            decision: new.decision,
            outcome: new.outcome,
            metadata: new.metadata,
            recorded_at: Utc::now(),
        }
    }
}
