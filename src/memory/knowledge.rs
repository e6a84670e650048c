//! Knowledge Graph: context, decision and outcome relations
//!
//! Nodes are identified by `kind:label`, so a label occurs at most once per
//! kind. Edge weights count how many experiences traversed the relation.

use crate::memory::types::Experience;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Node kinds in the knowledge graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Context,
    Decision,
    Outcome,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Decision => "decision",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEdge {
    pub from: String,
    pub to: String,
    pub weight: u64,
}

/// Nodes and edges created by one experience
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphDelta {
    pub new_nodes: usize,
    pub new_edges: usize,
}

/// Knowledge graph structure
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    /// Nodes in insertion order
    nodes: Vec<KnowledgeNode>,
    node_index: HashMap<String, usize>,
    /// Edges in insertion order
    edges: Vec<KnowledgeEdge>,
    edge_index: HashMap<(String, String), usize>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node identifier for a kind and label
    pub fn node_id(kind: NodeKind, label: &str) -> String {
        format!("{}:{}", kind.as_str(), label)
    }

    /// Link context -> decision -> outcome for an experience
    pub fn absorb(&mut self, experience: &Experience) -> GraphDelta {
        let mut delta = GraphDelta::default();

        let context = self.ensure_node(NodeKind::Context, &experience.context.task, &mut delta);
        let decision = self.ensure_node(NodeKind::Decision, &experience.decision.chosen, &mut delta);
        let outcome = self.ensure_node(NodeKind::Outcome, experience.outcome.class(), &mut delta);

        self.reinforce_edge(context, decision.clone(), &mut delta);
        self.reinforce_edge(decision, outcome, &mut delta);

        delta
    }

    fn ensure_node(&mut self, kind: NodeKind, label: &str, delta: &mut GraphDelta) -> String {
        let id = Self::node_id(kind, label);
        if !self.node_index.contains_key(&id) {
            self.node_index.insert(id.clone(), self.nodes.len());
            self.nodes.push(KnowledgeNode {
                id: id.clone(),
                kind,
                label: label.to_string(),
            });
            delta.new_nodes += 1;
        }
        id
    }

    fn reinforce_edge(&mut self, from: String, to: String, delta: &mut GraphDelta) {
        let key = (from, to);
        match self.edge_index.get(&key) {
            Some(&pos) => self.edges[pos].weight += 1,
            None => {
                self.edge_index.insert(key.clone(), self.edges.len());
                self.edges.push(KnowledgeEdge {
                    from: key.0,
                    to: key.1,
                    weight: 1,
                });
                delta.new_edges += 1;
            }
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.node_index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
        self.edge_index
            .get(&(from.to_string(), to.to_string()))
            .map(|&pos| self.edges[pos].weight)
    }

    /// Outgoing neighbours of a node, heaviest edge first
    pub fn neighbors(&self, node_id: &str) -> Vec<(KnowledgeNode, u64)> {
        let mut out: Vec<(KnowledgeNode, u64)> = self
            .edges
            .iter()
            .filter(|e| e.from == node_id)
            .filter_map(|e| self.find_node(&e.to).map(|n| (n.clone(), e.weight)))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
        out
    }

    pub fn nodes(&self) -> &[KnowledgeNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[KnowledgeEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.edge_index.clear();
    }
}
