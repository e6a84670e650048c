//! Event bus for engine state changes
//!
//! Explicit registry of event kind -> ordered handler list. Emission is
//! synchronous and follows registration order. A handler that returns an
//! error or panics is logged and skipped; it never aborts the emitting call
//! or the handlers after it.

use crate::errors::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, trace, warn};

use crate::learning::state::StateKey;
use crate::memory::patterns::PatternSignature;
use crate::memory::types::ExperienceId;

/// Event names callers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "experience:recorded")]
    ExperienceRecorded,
    #[serde(rename = "qlearning:updated")]
    QLearningUpdated,
    #[serde(rename = "pattern:discovered")]
    PatternDiscovered,
    #[serde(rename = "knowledge:updated")]
    KnowledgeUpdated,
    #[serde(rename = "prediction:generated")]
    PredictionGenerated,
    #[serde(rename = "state:reset")]
    StateReset,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::ExperienceRecorded,
        EventKind::QLearningUpdated,
        EventKind::PatternDiscovered,
        EventKind::KnowledgeUpdated,
        EventKind::PredictionGenerated,
        EventKind::StateReset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ExperienceRecorded => "experience:recorded",
            EventKind::QLearningUpdated => "qlearning:updated",
            EventKind::PatternDiscovered => "pattern:discovered",
            EventKind::KnowledgeUpdated => "knowledge:updated",
            EventKind::PredictionGenerated => "prediction:generated",
            EventKind::StateReset => "state:reset",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EngineError::UnknownEvent(s.to_string()))
    }
}

/// Engine events, published after the state change they describe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningEvent {
    ExperienceRecorded {
        experience_id: ExperienceId,
        task: String,
        decision: String,
        success: bool,
        /// Experience dropped by retention to make room, if any
        evicted: Option<ExperienceId>,
        timestamp: DateTime<Utc>,
    },

    QLearningUpdated {
        state_key: StateKey,
        action: String,
        reward: f64,
        previous_q: f64,
        q_value: f64,
        visit_count: u64,
        timestamp: DateTime<Utc>,
    },

    PatternDiscovered {
        signature: PatternSignature,
        occurrences: u64,
        success_rate: f64,
        description: String,
        timestamp: DateTime<Utc>,
    },

    KnowledgeUpdated {
        new_nodes: usize,
        new_edges: usize,
        total_nodes: usize,
        total_edges: usize,
        timestamp: DateTime<Utc>,
    },

    PredictionGenerated {
        state_key: StateKey,
        decision: String,
        success: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
    },

    StateReset {
        cleared_experiences: usize,
        timestamp: DateTime<Utc>,
    },
}

impl LearningEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LearningEvent::ExperienceRecorded { .. } => EventKind::ExperienceRecorded,
            LearningEvent::QLearningUpdated { .. } => EventKind::QLearningUpdated,
            LearningEvent::PatternDiscovered { .. } => EventKind::PatternDiscovered,
            LearningEvent::KnowledgeUpdated { .. } => EventKind::KnowledgeUpdated,
            LearningEvent::PredictionGenerated { .. } => EventKind::PredictionGenerated,
            LearningEvent::StateReset { .. } => EventKind::StateReset,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LearningEvent::ExperienceRecorded { timestamp, .. }
            | LearningEvent::QLearningUpdated { timestamp, .. }
            | LearningEvent::PatternDiscovered { timestamp, .. }
            | LearningEvent::KnowledgeUpdated { timestamp, .. }
            | LearningEvent::PredictionGenerated { timestamp, .. }
            | LearningEvent::StateReset { timestamp, .. } => *timestamp,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Event callback; an `Err` is logged and otherwise ignored
pub type EventHandler = Arc<dyn Fn(&LearningEvent) -> anyhow::Result<()> + Send + Sync>;

/// Synchronous publish/subscribe registry
pub struct EventBus {
    handlers: RwLock<HashMap<EventKind, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler for one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&LearningEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // Registry edits cannot leave a torn list behind, so a poisoned lock is still usable
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.entry(kind).or_default().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not registered for `kind`
    pub fn off(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        match handlers.get_mut(&kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|(sub, _)| *sub != id);
                before != list.len()
            }
            None => false,
        }
    }

    /// Deliver an event to its subscribers, returning how many succeeded
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe; changes apply from the next emission.
    pub fn emit(&self, event: &LearningEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(SubscriptionId, EventHandler)> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            match handlers.get(&kind) {
                Some(list) => list.clone(),
                None => return 0,
            }
        };

        trace!(event = %kind, subscribers = snapshot.len(), "Dispatching event");

        let mut delivered = 0;
        for (id, handler) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(event = %kind, subscription = id.0, "Event handler failed: {:#}", e);
                }
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(event = %kind, subscription = id.0, "Event handler panicked: {}", message);
                }
            }
        }
        delivered
    }

    /// Number of handlers registered for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts = f.debug_map();
        for kind in EventKind::ALL {
            counts.entry(&kind.as_str(), &self.handler_count(kind));
        }
        counts.finish()
    }
}
