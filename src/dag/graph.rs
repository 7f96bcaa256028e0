// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::node::{Node, NodeId};
use crate::errors::{PipelineError, Result};

/// A directed dependency edge: `from` must succeed before `to` may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

/// In-memory pipeline DAG.
///
/// Nodes keep their insertion order. Edges are never stored: they are
/// resolved from each node's `dependencies` every time they are asked for,
/// so dependencies on ids that are not in the graph simply produce no edge.
#[derive(Debug, Clone, Default)]
pub struct PipelineGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl PipelineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes in declaration order.
    ///
    /// The first failing [`add_node`](Self::add_node) aborts construction.
    pub fn from_nodes<I>(nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        debug!(nodes = graph.len(), "pipeline graph constructed");
        Ok(graph)
    }

    /// Append a node.
    ///
    /// Fails with `DuplicateId` if the id is taken, and with `CycleDetected`
    /// if the node closes a dependency cycle (for example by resolving a
    /// dependency that an earlier node declared on it). On failure the graph
    /// is left exactly as it was.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(PipelineError::DuplicateId(node.id));
        }

        let id = node.id.clone();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);

        if let Some(member) = self.cycle_member() {
            let member = member.to_string();
            self.nodes.pop();
            self.index.remove(&id);
            return Err(PipelineError::CycleDetected(format!(
                "adding node '{}' creates a cycle involving node '{}'",
                id, member
            )));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Dependency edges, recomputed on every call.
    ///
    /// Ordered by the dependent's declaration order, then by the order of its
    /// dependency list. A dependency listed twice yields one edge.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> + '_ {
        self.nodes.iter().flat_map(move |node| {
            node.dependencies
                .iter()
                .enumerate()
                .filter(move |(i, dep)| {
                    self.index.contains_key(dep.as_str()) && !node.dependencies[..*i].contains(*dep)
                })
                .map(move |(_, dep)| Edge {
                    from: dep.as_str(),
                    to: node.id.as_str(),
                })
        })
    }

    /// Resolved dependencies of a node (ids present in the graph only).
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        node.dependencies
            .iter()
            .map(|d| d.as_str())
            .filter(|d| self.contains(d) && seen.insert(*d))
            .collect()
    }

    /// Nodes that list `id` as a dependency, in declaration order.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.edges()
            .filter(|edge| edge.from == id)
            .map(|edge| edge.to)
            .collect()
    }

    /// Every node that depends on `id` directly or through other nodes.
    ///
    /// Returned in declaration order; `id` itself is not included.
    pub fn transitive_dependents_of(&self, id: &str) -> Vec<&str> {
        let mut reached: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self.dependents_of(id);

        while let Some(name) = stack.pop() {
            if reached.insert(name) {
                stack.extend(self.dependents_of(name));
            }
        }

        self.nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|n| reached.contains(n))
            .collect()
    }

    /// Nodes without resolved dependencies.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| !n.dependencies.iter().any(|d| self.contains(d)))
    }

    /// Nodes ordered so that each one comes after all of its dependencies.
    ///
    /// Among nodes that are ready at the same time, declaration order wins,
    /// so the result is stable for a given definition.
    pub fn topological_order(&self) -> Result<Vec<&Node>> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for edge in self.edges() {
            let from = self.index[edge.from];
            let to = self.index[edge.to];
            in_degree[to] += 1;
            dependents[from].push(to);
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = ready.pop_first() {
            order.push(&self.nodes[i]);
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() == n {
            return Ok(order);
        }

        let member = self
            .cycle_member()
            .map(|s| s.to_string())
            .or_else(|| {
                (0..n)
                    .find(|&i| in_degree[i] > 0)
                    .map(|i| self.nodes[i].id.clone())
            })
            .unwrap_or_default();

        Err(PipelineError::CycleDetected(format!(
            "cycle detected in pipeline involving node '{}'",
            member
        )))
    }

    /// Id of some node on a dependency cycle, if the graph has one.
    fn cycle_member(&self) -> Option<&str> {
        // Edge direction: dependency -> dependent.
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

        for i in 0..self.nodes.len() {
            graph.add_node(i);
        }

        for edge in self.edges() {
            graph.add_edge(self.index[edge.from], self.index[edge.to], ());
        }

        match toposort(&graph, None) {
            Ok(_order) => None,
            Err(cycle) => Some(self.nodes[cycle.node_id()].id.as_str()),
        }
    }
}
