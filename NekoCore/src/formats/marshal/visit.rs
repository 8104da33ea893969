//! Depth-first traversal over a Marshal graph
//!
//! Every reachable node is visited once, pre-order, using an explicit stack
//! and an identity-keyed visited set. Shared nodes and cycles are therefore
//! harmless, and deep graphs cannot exhaust the call stack.

use super::document::{Graph, NodeId, Value};
use std::collections::HashSet;

/// Traversal state, usable directly when the caller needs to interleave its
/// own work between visiting a node and descending into it.
#[derive(Debug, Default)]
pub struct Walker {
    stack: Vec<NodeId>,
    visited: HashSet<NodeId>,
}

impl Walker {
    #[must_use]
    pub fn new(root: &Value) -> Self {
        let mut walker = Walker::default();
        if let Some(id) = root.node_id() {
            walker.stack.push(id);
        }
        walker
    }

    /// Pop the next node not seen yet and mark it visited.
    pub fn next_node(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            if self.visited.insert(id) {
                return Some(id);
            }
        }
        None
    }

    /// Schedule the children of `id`, first child on top.
    pub fn descend(&mut self, graph: &Graph, id: NodeId) {
        let Some(node) = graph.node(id) else {
            return;
        };
        let start = self.stack.len();
        self.stack.extend(
            node.children()
                .filter_map(Value::node_id)
                .filter(|child| !self.visited.contains(child)),
        );
        self.stack[start..].reverse();
    }

    /// Number of distinct nodes visited so far.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Visit every node reachable from `root`.
pub fn walk<F>(graph: &Graph, root: &Value, mut visit: F)
where
    F: FnMut(&Graph, NodeId),
{
    let mut walker = Walker::new(root);
    while let Some(id) = walker.next_node() {
        visit(graph, id);
        walker.descend(graph, id);
    }
    tracing::trace!("Walked {} node(s)", walker.visited_count());
}

/// Visit every node reachable from `root`, allowing the callback to mutate
/// the graph.
///
/// Children are collected after the callback returns, so nodes it adds to a
/// visited node are walked as well.
pub fn walk_mut<F>(graph: &mut Graph, root: &Value, mut visit: F)
where
    F: FnMut(&mut Graph, NodeId),
{
    let mut walker = Walker::new(root);
    while let Some(id) = walker.next_node() {
        visit(graph, id);
        walker.descend(graph, id);
    }
    tracing::trace!("Walked {} node(s) for rewrite", walker.visited_count());
}

#[cfg(test)]
mod tests {
    use super::super::document::{Node, Symbol};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_walk_preorder() {
        let mut graph = Graph::new();
        let a = graph.string("a");
        let b = graph.string("b");
        let inner = graph.array(vec![b.clone()]);
        let root = graph.array(vec![a.clone(), inner.clone()]);

        let mut order = Vec::new();
        walk(&graph, &root, |_, id| order.push(Value::Node(id)));
        assert_eq!(order, vec![root, a, inner, b]);
    }

    #[test]
    fn test_walk_shared_and_cyclic() {
        let mut graph = Graph::new();
        let shared = graph.string("shared");
        let root = graph.array(vec![shared.clone(), shared.clone()]);
        let root_id = root.node_id().unwrap();
        graph.array_mut(root_id).unwrap().push(root.clone());

        let mut count = 0;
        walk(&graph, &root, |_, _| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_walk_annotated_and_hash() {
        let mut graph = Graph::new();
        let name = graph.utf8_string("key");
        let value = graph.string("value");
        let hash = graph.add(Node::Hash(vec![(name, value)]));
        let root = graph.object("Holder", [("@data", hash)]);

        let mut kinds = Vec::new();
        walk(&graph, &root, |g, id| kinds.push(g.node(id).unwrap().kind_name()));
        assert_eq!(kinds, vec!["object", "hash", "annotated", "string", "string"]);
    }

    #[test]
    fn test_walk_mut_rewrites_strings() {
        let mut graph = Graph::new();
        let first = graph.utf8_string("hello");
        let second = graph.utf8_string("world");
        let root = graph.array(vec![
            first.clone(),
            second.clone(),
            Value::Symbol(Symbol::new("x")),
        ]);

        walk_mut(&mut graph, &root, |g, id| {
            if let Some(Node::Str(bytes)) = g.node_mut(id) {
                bytes.make_ascii_uppercase();
            }
        });
        assert_eq!(graph.text(&first).as_deref(), Some("HELLO"));
        assert_eq!(graph.text(&second).as_deref(), Some("WORLD"));
    }

    #[test]
    fn test_walker_counts_shared_nodes_once() {
        let mut graph = Graph::new();
        let shared = graph.string("shared");
        let inner = graph.array(vec![shared.clone()]);
        let root = graph.array(vec![shared, inner.clone(), inner]);

        let mut walker = Walker::new(&root);
        assert_eq!(walker.visited_count(), 0);
        while let Some(id) = walker.next_node() {
            walker.descend(&graph, id);
        }
        assert_eq!(walker.visited_count(), 3);
    }

    #[test]
    fn test_walk_immediate_root() {
        let graph = Graph::new();
        let mut count = 0;
        walk(&graph, &Value::Int(3), |_, _| count += 1);
        assert_eq!(count, 0);
    }
}
