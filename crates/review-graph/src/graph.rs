//! Pipeline graph
//!
//! An explicit, immutable node list + edge list, validated once before any
//! execution: single entry, reachable finish, no cycles, every node reachable
//! from the entry. Validation also computes the execution waves (topological
//! levels) the executor walks.
//!
//! ```text
//!   summarize → critique → suggestions ─┬→ security
//!                                       ├→ architecture
//!                                       ├→ test_coverage
//!                                       ├→ ui
//!                                       ├→ dependency
//!                                       ├→ performance
//!                                       └→ readability (finish)
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::GraphBuildError;
use crate::node::ReviewNode;
use crate::visualization::{render_edge, render_node, END_NODE, START_NODE};

/// Directed dependency between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub from: ReviewNode,
    pub to: ReviewNode,
}

/// Builder for pipeline graphs with fluent API.
#[derive(Debug, Clone, Default)]
pub struct PipelineGraphBuilder {
    name: String,
    nodes: Vec<ReviewNode>,
    edges: Vec<GraphEdge>,
    entry_point: Option<ReviewNode>,
    finish_point: Option<ReviewNode>,
}

impl PipelineGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a node. Declaration order is the report order.
    pub fn node(mut self, node: ReviewNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn entry(mut self, node: ReviewNode) -> Self {
        self.entry_point = Some(node);
        self
    }

    pub fn finish(mut self, node: ReviewNode) -> Self {
        self.finish_point = Some(node);
        self
    }

    /// `to` may only run after `from` has completed.
    pub fn edge(mut self, from: ReviewNode, to: ReviewNode) -> Self {
        self.edges.push(GraphEdge { from, to });
        self
    }

    /// Validate and build the graph.
    pub fn build(self) -> Result<PipelineGraph, GraphBuildError> {
        let entry = self.entry_point.ok_or(GraphBuildError::NoEntryPoint)?;
        let finish = self.finish_point.ok_or(GraphBuildError::NoFinishPoint)?;

        let mut declared = HashSet::new();
        for node in &self.nodes {
            if !declared.insert(*node) {
                return Err(GraphBuildError::DuplicateNode(*node));
            }
        }
        for node in [entry, finish] {
            if !declared.contains(&node) {
                return Err(GraphBuildError::UnknownNode(node));
            }
        }

        let mut edges: Vec<GraphEdge> = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            for end in [edge.from, edge.to] {
                if !declared.contains(&end) {
                    return Err(GraphBuildError::UnknownNode(end));
                }
            }
            if edge.from == edge.to {
                return Err(GraphBuildError::Cycle {
                    from: edge.from,
                    to: edge.to,
                });
            }
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }

        if edges.iter().any(|e| e.from == finish) {
            return Err(GraphBuildError::FinishNotTerminal(finish));
        }

        let reachable = reachable_from(entry, &edges);
        if let Some(node) = self.nodes.iter().find(|n| !reachable.contains(n)) {
            return Err(GraphBuildError::Unreachable(*node));
        }

        let waves = topological_waves(&self.nodes, &edges)?;

        Ok(PipelineGraph {
            name: self.name,
            nodes: self.nodes,
            edges,
            entry,
            finish,
            waves,
        })
    }
}

/// Validated pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineGraph {
    name: String,
    nodes: Vec<ReviewNode>,
    edges: Vec<GraphEdge>,
    entry: ReviewNode,
    finish: ReviewNode,
    waves: Vec<Vec<ReviewNode>>,
}

impl PipelineGraph {
    pub fn builder() -> PipelineGraphBuilder {
        PipelineGraphBuilder::new()
    }

    /// The review topology: the fixed spine, then fan-out from `suggestions`
    /// to the given branches. The finish node is the last branch, or
    /// `suggestions` when no branch is active.
    pub fn review(branches: &[ReviewNode]) -> Result<Self, GraphBuildError> {
        let [summarize, critique, suggestions] = ReviewNode::SPINE;

        let mut builder = Self::builder()
            .name("commit_review")
            .node(summarize)
            .node(critique)
            .node(suggestions)
            .entry(summarize)
            .edge(summarize, critique)
            .edge(critique, suggestions);

        for branch in branches {
            builder = builder.node(*branch).edge(suggestions, *branch);
        }

        builder
            .finish(branches.last().copied().unwrap_or(suggestions))
            .build()
    }

    /// Spine plus every branch.
    pub fn full_review() -> Result<Self, GraphBuildError> {
        Self::review(&ReviewNode::BRANCHES)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes in declared order.
    pub fn nodes(&self) -> &[ReviewNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn entry(&self) -> ReviewNode {
        self.entry
    }

    pub fn finish(&self) -> ReviewNode {
        self.finish
    }

    /// Execution waves: every node of a wave has all of its predecessors in
    /// earlier waves. Nodes inside a wave keep declared order.
    pub fn waves(&self) -> &[Vec<ReviewNode>] {
        &self.waves
    }

    pub fn contains(&self, node: ReviewNode) -> bool {
        self.nodes.contains(&node)
    }

    /// Direct predecessors of a node.
    pub fn predecessors(&self, node: ReviewNode) -> Vec<ReviewNode> {
        self.edges
            .iter()
            .filter(|e| e.to == node)
            .map(|e| e.from)
            .collect()
    }

    /// Active branch nodes (everything outside the spine), in declared order.
    pub fn branches(&self) -> Vec<ReviewNode> {
        self.nodes.iter().copied().filter(|n| !n.is_spine()).collect()
    }

    /// Generate a Mermaid diagram of the graph.
    ///
    /// # Example Output
    ///
    /// ```text
    /// graph TD
    ///     __start__([START])
    ///     summarize[summarize]
    ///     critique[critique]
    ///     __end__([END])
    ///
    ///     __start__ --> summarize
    ///     summarize --> critique
    ///     critique --> __end__
    /// ```
    pub fn to_mermaid(&self) -> String {
        let mut lines = vec!["graph TD".to_string(), render_node(START_NODE, true)];
        lines.extend(self.nodes.iter().map(|n| render_node(n.name(), false)));
        lines.push(render_node(END_NODE, true));
        lines.push(String::new());

        lines.push(render_edge(START_NODE, self.entry.name()));
        lines.extend(self.edges.iter().map(|e| render_edge(e.from.name(), e.to.name())));
        lines.push(render_edge(self.finish.name(), END_NODE));

        lines.join("\n")
    }
}

fn reachable_from(entry: ReviewNode, edges: &[GraphEdge]) -> HashSet<ReviewNode> {
    let mut seen = HashSet::from([entry]);
    let mut queue = VecDeque::from([entry]);
    while let Some(node) = queue.pop_front() {
        for edge in edges.iter().filter(|e| e.from == node) {
            if seen.insert(edge.to) {
                queue.push_back(edge.to);
            }
        }
    }
    seen
}

/// Kahn's algorithm, level by level.
fn topological_waves(
    nodes: &[ReviewNode],
    edges: &[GraphEdge],
) -> Result<Vec<Vec<ReviewNode>>, GraphBuildError> {
    let mut in_degree: HashMap<ReviewNode, usize> = nodes.iter().map(|n| (*n, 0)).collect();
    for edge in edges {
        *in_degree.entry(edge.to).or_default() += 1;
    }

    let mut waves = Vec::new();
    let mut placed = HashSet::new();
    let mut current: Vec<ReviewNode> = nodes
        .iter()
        .copied()
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();

    while !current.is_empty() {
        placed.extend(current.iter().copied());
        for edge in edges.iter().filter(|e| current.contains(&e.from)) {
            if let Some(degree) = in_degree.get_mut(&edge.to) {
                *degree -= 1;
            }
        }
        let next: Vec<ReviewNode> = nodes
            .iter()
            .copied()
            .filter(|n| !placed.contains(n) && in_degree.get(n) == Some(&0))
            .collect();
        waves.push(std::mem::replace(&mut current, next));
    }

    if placed.len() < nodes.len() {
        let edge = edges
            .iter()
            .find(|e| !placed.contains(&e.from) && !placed.contains(&e.to))
            .copied()
            .ok_or(GraphBuildError::Unreachable(nodes[0]))?;
        return Err(GraphBuildError::Cycle {
            from: edge.from,
            to: edge.to,
        });
    }

    Ok(waves)
}
