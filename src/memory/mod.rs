//! Memory System
//!
//! Stores recorded experiences and the structures mined from them.
//!
//! Components:
//! - Experience Store: bounded, append-only experience log
//! - Pattern Miner: recurring (task, decision) success patterns
//! - Knowledge Graph: context -> decision -> outcome relations

pub mod experience;
pub mod knowledge;
pub mod patterns;
pub mod types;

pub use experience::ExperienceStore;
pub use knowledge::{KnowledgeEdge, KnowledgeGraph, KnowledgeNode, NodeKind};
pub use patterns::{Pattern, PatternMiner, PatternSignature};
pub use types::{Context, Decision, Experience, ExperienceId, Metadata, NewExperience, Outcome};
