//! Small undirected graph with shortest-path lookup.

use std::collections::BTreeMap;

use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};

use rune_motion::{NodeId, PathFinder};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: UnGraph<NodeId, ()>,
    indices: BTreeMap<NodeId, NodeIndex>,
}

impl Graph {
    pub fn from_edges(edges: &[(&str, &str)]) -> Self {
        let mut graph = Self::default();
        for (a, b) in edges {
            graph.add_edge(NodeId::from(*a), NodeId::from(*b));
        }
        graph
    }

    fn index_of(&mut self, id: NodeId) -> NodeIndex {
        if let Some(index) = self.indices.get(&id) {
            return *index;
        }
        let index = self.graph.add_node(id.clone());
        self.indices.insert(id, index);
        index
    }

    /// Connect `a` and `b`, adding either node if missing. Repeated edges are merged.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) {
        let a = self.index_of(a);
        let b = self.index_of(b);
        self.graph.update_edge(a, b, ());
    }

    /// Nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.indices.keys()
    }
}

impl PathFinder for Graph {
    fn find_path(&self, from: &NodeId, to: &NodeId) -> Option<Vec<NodeId>> {
        let start = *self.indices.get(from)?;
        let goal = *self.indices.get(to)?;

        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1u32, |_| 0u32)?;
        Some(path.into_iter().map(|index| self.graph[index].clone()).collect())
    }
}
