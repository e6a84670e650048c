//! Adaptive Learning Engine
//!
//! Ties the experience log, the Q-learner, the pattern miner and the
//! knowledge graph together behind one lock discipline:
//!
//! - a writer gate serializes mutating calls, so each experience updates every
//!   component and has its events delivered before the next writer starts;
//! - the component state sits behind a reader-writer lock, so readers always
//!   see a fully applied experience and never a torn one;
//! - events are dispatched after the state lock is released, so handlers may
//!   call read operations. Handlers must not call `record_experience` or
//!   `reset` on the engine that is notifying them.

pub mod statistics;

pub use statistics::{GraphExport, KnowledgeExport, Statistics};

use crate::config::LearningConfig;
use crate::errors::{EngineError, Result};
use crate::events::{EventBus, EventKind, LearningEvent, SubscriptionId};
use crate::learning::prediction::{PredictionEngine, PredictionResult};
use crate::learning::qlearner::QLearner;
use crate::learning::state::StateKey;
use crate::memory::experience::ExperienceStore;
use crate::memory::knowledge::{KnowledgeGraph, KnowledgeNode};
use crate::memory::patterns::PatternMiner;
use crate::memory::types::{Context, Experience, ExperienceId, NewExperience};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Stored value of one candidate action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    pub action: String,
    pub q_value: f64,
    pub visit_count: u64,
}

/// Everything guarded by the state lock
#[derive(Debug)]
struct EngineState {
    experiences: ExperienceStore,
    learner: QLearner,
    miner: PatternMiner,
    graph: KnowledgeGraph,
}

impl EngineState {
    fn new(config: &LearningConfig) -> Result<Self> {
        Ok(Self {
            experiences: ExperienceStore::new(config.max_experiences),
            learner: QLearner::new(config.learning_rate, config.exploration_rate)?,
            miner: PatternMiner::new(config.pattern_threshold),
            graph: KnowledgeGraph::new(),
        })
    }

    /// Apply one validated experience to every component
    ///
    /// The value update is planned first: a non-finite value aborts before
    /// anything has been written.
    fn apply(&mut self, experience: Experience) -> Vec<LearningEvent> {
        let state_key = StateKey::from_context(&experience.context);
        let update = self
            .learner
            .plan_update(&state_key, &experience.decision.chosen, &experience.outcome);

        let discovered = self.miner.observe(&experience);
        let delta = self.graph.absorb(&experience);
        self.learner.commit(&update);

        let recorded_at = experience.recorded_at;
        let experience_id = experience.id;
        let task = experience.context.task.clone();
        let decision = experience.decision.chosen.clone();
        let success = experience.outcome.success;

        let evicted = self.experiences.append(experience).map(|old| old.id);
        if let Some(old) = evicted {
            debug!(evicted = %old, "Experience log at capacity, evicted oldest entry");
        }

        debug!(
            state = %update.state_key,
            action = %update.action,
            reward = update.reward,
            q = update.q_value,
            visits = update.visit_count,
            "Q-value updated"
        );

        let now = Utc::now();
        let mut events = Vec::with_capacity(4);
        events.push(LearningEvent::ExperienceRecorded {
            experience_id,
            task,
            decision,
            success,
            evicted,
            timestamp: recorded_at,
        });
        events.push(LearningEvent::QLearningUpdated {
            state_key: update.state_key,
            action: update.action,
            reward: update.reward,
            previous_q: update.previous_q,
            q_value: update.q_value,
            visit_count: update.visit_count,
            timestamp: now,
        });
        if let Some(pattern) = discovered {
            info!(
                signature = %pattern.signature,
                occurrences = pattern.occurrences,
                success_rate = pattern.success_rate,
                "Pattern discovered"
            );
            events.push(LearningEvent::PatternDiscovered {
                description: pattern.description(),
                signature: pattern.signature,
                occurrences: pattern.occurrences,
                success_rate: pattern.success_rate,
                timestamp: now,
            });
        }
        events.push(LearningEvent::KnowledgeUpdated {
            new_nodes: delta.new_nodes,
            new_edges: delta.new_edges,
            total_nodes: self.graph.node_count(),
            total_edges: self.graph.edge_count(),
            timestamp: now,
        });

        events
    }

    fn statistics(&self) -> Statistics {
        Statistics {
            total_experiences: self.experiences.total_recorded(),
            stored_experiences: self.experiences.len(),
            evicted_experiences: self.experiences.evicted(),
            patterns_discovered: self.miner.pattern_count(),
            knowledge_nodes: self.graph.node_count(),
            knowledge_edges: self.graph.edge_count(),
            q_table_entries: self.learner.len(),
            exploration_rate: self.learner.exploration_rate(),
            learning_rate: self.learner.learning_rate(),
        }
    }
}

/// In-process decision-support engine
pub struct AdaptiveEngine {
    config: LearningConfig,
    /// Serializes mutating calls, including their event delivery
    writer: Mutex<()>,
    state: RwLock<EngineState>,
    rng: Mutex<StdRng>,
    events: EventBus,
    predictor: PredictionEngine,
}

impl AdaptiveEngine {
    /// Create an engine with validated configuration
    pub fn new(config: LearningConfig) -> Result<Self> {
        config.validate()?;
        let state = EngineState::new(&config)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!(
            learning_rate = config.learning_rate,
            exploration_rate = config.exploration_rate,
            max_experiences = ?config.max_experiences,
            "Adaptive engine created"
        );

        Ok(Self {
            state: RwLock::new(state),
            writer: Mutex::new(()),
            rng: Mutex::new(rng),
            events: EventBus::new(),
            predictor: PredictionEngine::new(config.max_recommendations),
            config,
        })
    }

    /// Create an engine with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(LearningConfig::default())
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Record an experience and update every learning component
    ///
    /// Validation happens before anything is touched. Emits, in order,
    /// `experience:recorded`, `qlearning:updated`, `pattern:discovered` (on
    /// the discovering experience only) and `knowledge:updated`.
    pub fn record_experience(&self, experience: NewExperience) -> Result<ExperienceId> {
        experience.validate()?;

        let _writer = self.writer.lock()?;
        let experience = Experience::stamp(experience);
        let id = experience.id;

        let events = {
            let mut state = self.state.write()?;
            state.apply(experience)
        };

        for event in &events {
            self.events.emit(event);
        }

        Ok(id)
    }

    /// Epsilon-greedy action choice among `actions`
    pub fn get_best_action<S: AsRef<str>>(&self, context: &Context, actions: &[S]) -> Result<String> {
        if actions.is_empty() {
            return Err(EngineError::EmptyActionSet);
        }

        let state_key = StateKey::from_context(context);
        let state = self.state.read()?;
        let mut rng = self.rng.lock()?;
        let choice = state.learner.select_action(&state_key, actions, &mut *rng)?;

        debug!(state = %state_key, candidates = actions.len(), choice = %choice, "Action selected");
        Ok(choice)
    }

    /// Forecast the outcome of `decision` in `context`
    ///
    /// Always emits `prediction:generated`, including for the neutral prior.
    pub fn predict_outcome(&self, context: &Context, decision: &str) -> Result<PredictionResult> {
        let result = {
            let state = self.state.read()?;
            self.predictor.predict(&state.learner, &state.miner, context, decision)?
        };

        self.events.emit(&LearningEvent::PredictionGenerated {
            state_key: StateKey::from_context(context),
            decision: decision.to_string(),
            success: result.predicted_outcome.success,
            confidence: result.confidence,
            timestamp: Utc::now(),
        });

        Ok(result)
    }

    /// Stored values for each candidate, in candidate order
    pub fn action_values<S: AsRef<str>>(&self, context: &Context, actions: &[S]) -> Result<Vec<ActionValue>> {
        let state_key = StateKey::from_context(context);
        let state = self.state.read()?;

        Ok(actions
            .iter()
            .map(|action| {
                let action = action.as_ref();
                let (q_value, visit_count) = state
                    .learner
                    .entry(&state_key, action)
                    .map_or((0.0, 0), |e| (e.q_value, e.visit_count));
                ActionValue {
                    action: action.to_string(),
                    q_value,
                    visit_count,
                }
            })
            .collect())
    }

    pub fn statistics(&self) -> Result<Statistics> {
        Ok(self.state.read()?.statistics())
    }

    /// Owned snapshot of patterns, graph, value table and counters
    pub fn export_knowledge(&self) -> Result<KnowledgeExport> {
        let state = self.state.read()?;
        Ok(KnowledgeExport {
            patterns: state.miner.patterns(),
            knowledge_graph: GraphExport {
                nodes: state.graph.nodes().to_vec(),
                edges: state.graph.edges().to_vec(),
            },
            q_table: state.learner.entries(),
            statistics: state.statistics(),
        })
    }

    /// Most recent experiences, oldest first
    pub fn recent_experiences(&self, limit: usize) -> Result<Vec<Experience>> {
        Ok(self.state.read()?.experiences.recent(limit))
    }

    pub fn experience(&self, id: &ExperienceId) -> Result<Option<Experience>> {
        Ok(self.state.read()?.experiences.get(id).cloned())
    }

    /// Outgoing graph neighbours of a node id such as `context:api_development`
    pub fn knowledge_neighbors(&self, node_id: &str) -> Result<Vec<(KnowledgeNode, u64)>> {
        Ok(self.state.read()?.graph.neighbors(node_id))
    }

    /// Clear all logged and derived state; emits `state:reset`
    pub fn reset(&self) -> Result<()> {
        let _writer = self.writer.lock()?;

        let cleared = {
            let mut state = self.state.write()?;
            let cleared = state.experiences.len();
            *state = EngineState::new(&self.config)?;
            cleared
        };

        info!(cleared_experiences = cleared, "Engine state reset");
        self.events.emit(&LearningEvent::StateReset {
            cleared_experiences: cleared,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    /// Subscribe to an event kind
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&LearningEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Subscribe by event name, e.g. `"pattern:discovered"`
    pub fn on_named<F>(&self, name: &str, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&LearningEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let kind: EventKind = name.parse()?;
        Ok(self.events.on(kind, handler))
    }

    /// Unsubscribe; returns false if the subscription was not found
    pub fn off(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.events.off(kind, id)
    }
}

impl std::fmt::Debug for AdaptiveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveEngine")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
