//! Read-only aggregates and snapshots

use crate::learning::qlearner::QTableEntry;
use crate::memory::knowledge::{KnowledgeEdge, KnowledgeNode};
use crate::memory::patterns::Pattern;
use serde::{Deserialize, Serialize};

/// Aggregate counters, as of the last completed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Experiences recorded since construction or the last reset
    pub total_experiences: u64,
    /// Experiences currently held in the log
    pub stored_experiences: usize,
    /// Experiences dropped by retention
    pub evicted_experiences: u64,
    pub patterns_discovered: usize,
    pub knowledge_nodes: usize,
    pub knowledge_edges: usize,
    pub q_table_entries: usize,
    pub exploration_rate: f64,
    pub learning_rate: f64,
}

/// Knowledge graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<KnowledgeNode>,
    pub edges: Vec<KnowledgeEdge>,
}

impl GraphExport {
    /// Nodes plus edges
    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Owned snapshot of everything the engine has learned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeExport {
    pub patterns: Vec<Pattern>,
    pub knowledge_graph: GraphExport,
    pub q_table: Vec<QTableEntry>,
    pub statistics: Statistics,
}
