mod build;
mod summary;

use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::ledger::Address;

pub use build::{build, build_with_rejections};
pub use summary::{NodeSummary, summarize};

#[derive(Clone, Debug)]
pub struct Node {
    pub id: Address,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
    pub radius: f32,
}

impl Node {
    fn new(id: Address) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pinned: None,
            radius: node_radius(0),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: Address,
    pub target: Address,
    pub weight: f64,
}

/// Node arena plus id-keyed edges. Nodes keep first-appearance order.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<Address, usize>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &Address) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &Address) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: &Address) -> Option<&mut Node> {
        self.index_of(id).map(|index| &mut self.nodes[index])
    }

    /// Resolves edge endpoints through the arena, skipping any edge whose
    /// endpoints are not present.
    pub fn resolve_edges_into(&self, out: &mut Vec<(usize, usize)>) {
        out.clear();
        out.reserve(self.edges.len().saturating_sub(out.capacity()));
        for edge in &self.edges {
            if let (Some(source), Some(target)) =
                (self.index_of(&edge.source), self.index_of(&edge.target))
            {
                out.push((source, target));
            }
        }
    }

    /// Edge count per node, counting both ends.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            if let Some(source) = self.index_of(&edge.source) {
                degrees[source] += 1;
            }
            if let Some(target) = self.index_of(&edge.target) {
                degrees[target] += 1;
            }
        }
        degrees
    }

    fn insert_node(&mut self, id: &Address) -> usize {
        if let Some(index) = self.index_of(id) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(Node::new(id.clone()));
        self.index_by_id.insert(id.clone(), index);
        index
    }
}

pub fn node_radius(degree: usize) -> f32 {
    (7.0 + (degree as f32).sqrt() * 2.5).min(26.0)
}
