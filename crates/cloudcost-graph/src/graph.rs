//! The instance-level dependency graph. Nodes are canonical instance
//! addresses (as plain strings — this crate never needs to parse
//! them, only order them); edges come from `depends_on`, implicit
//! attribute references, and provider dependencies collected upstream.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A directed dependency graph over instance addresses. `from -> to`
/// means "`from` depends on `to`" (`to` must be costed before `from`).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, address: impl Into<String>) {
        let address = address.into();
        self.edges.entry(address.clone()).or_default();
        self.nodes.insert(address);
    }

    /// Adds a dependency edge, deduplicating repeats (the same
    /// reference appearing twice in an expression contributes one
    /// edge).
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(from.clone());
        self.add_node(to.clone());
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn dependencies_of(&self, node: &str) -> impl Iterator<Item = &String> {
        self.edges.get(node).into_iter().flatten()
    }

    /// Kahn's algorithm over the reversed graph (dependencies before
    /// dependents), breaking ties lexicographically by address for a
    /// deterministic order across runs.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> = self.nodes.iter().map(|n| (n.as_str(), 0)).collect();
        let mut dependents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for (from, tos) in &self.edges {
            for to in tos {
                *in_degree.get_mut(from.as_str()).unwrap() += 1;
                dependents.entry(to.as_str()).or_default().insert(from.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(n, _)| *n)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<&str> = VecDeque::new();
        while let Some(next) = ready.iter().next().copied() {
            ready.remove(next);
            queue.push_back(next);
        }

        while let Some(node) = queue.pop_front() {
            order.push(node.to_string());
            if let Some(deps) = dependents.get(node) {
                let mut newly_ready: Vec<&str> = Vec::new();
                for &dependent in deps {
                    let deg = in_degree.get_mut(dependent).unwrap();
                    *deg -= 1;
                    if *deg == 0 {
                        newly_ready.push(dependent);
                    }
                }
                newly_ready.sort_unstable();
                for n in newly_ready {
                    queue.push_back(n);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let cycle = self.find_cycle().unwrap_or_default();
            return Err(Error::cycle(cycle));
        }

        Ok(order)
    }

    /// DFS-based cycle detection using a white/gray/black coloring.
    /// Returns the cycle path (as addresses, first repeated at the
    /// end) if one exists.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(PartialEq, Eq, Clone, Copy)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: BTreeMap<&str, Color> = self.nodes.iter().map(|n| (n.as_str(), Color::White)).collect();
        let mut parent: BTreeMap<&str, &str> = BTreeMap::new();

        for start in &self.nodes {
            if color[start.as_str()] != Color::White {
                continue;
            }
            let mut stack = vec![(start.as_str(), self.edges.get(start.as_str()).into_iter().flatten())];
            color.insert(start.as_str(), Color::Gray);

            'outer: while let Some((node, iter)) = stack.last_mut() {
                let node = *node;
                for next in iter.by_ref() {
                    match color[next.as_str()] {
                        Color::White => {
                            color.insert(next.as_str(), Color::Gray);
                            parent.insert(next.as_str(), node);
                            stack.push((next.as_str(), self.edges.get(next.as_str()).into_iter().flatten()));
                            continue 'outer;
                        }
                        Color::Gray => {
                            return Some(reconstruct_cycle(&parent, node, next));
                        }
                        Color::Black => {}
                    }
                }
                color.insert(node, Color::Black);
                stack.pop();
            }
        }

        None
    }
}

fn reconstruct_cycle<'a>(parent: &BTreeMap<&'a str, &'a str>, closing: &'a str, target: &'a str) -> Vec<String> {
    let mut path = vec![closing.to_string()];
    let mut current = closing;
    while current != target {
        match parent.get(current) {
            Some(p) => {
                path.push((*p).to_string());
                current = p;
            }
            None => break,
        }
    }
    path.push(target.to_string());
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_sorts_to_empty_order() {
        let graph = DependencyGraph::new();
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("c", "b");
        graph.add_edge("b", "a");
        let order = graph.topological_order().unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn independent_nodes_break_ties_lexicographically() {
        let mut graph = DependencyGraph::new();
        graph.add_node("z");
        graph.add_node("a");
        graph.add_node("m");
        let order = graph.topological_order().unwrap();
        assert_eq!(order, vec!["a", "m", "z"]);
    }

    #[test]
    fn detects_direct_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        assert!(graph.topological_order().is_err());
        let cycle = graph.find_cycle().unwrap();
        assert!(cycle.len() >= 2);
    }

    #[test]
    fn detects_indirect_cycle_and_reports_path() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "a");
        let cycle = graph.find_cycle().unwrap();
        // every edge in the reconstructed path must exist in the graph
        for pair in cycle.windows(2) {
            assert!(graph.dependencies_of(&pair[0]).any(|d| d == &pair[1]));
        }
    }

    #[test]
    fn deduplicates_repeated_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("a", "b");
        assert_eq!(graph.edge_count(), 1);
    }
}
