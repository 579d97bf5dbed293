use std::collections::HashMap;

use super::node::Node;
use crate::error::{ChainError, Result};

/// Weighted word-transition graph.
///
/// Maps each registered token to its [`Node`]. An edge `a -> b` with
/// weight `w` means `b` immediately followed `a` `w` times in the
/// ingested text.
///
/// # Invariants
/// - Weights only grow, nodes are never removed
/// - Edges can only start from a registered token; their target does
///   not have to be registered (such a token is a sink)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightedGraph {
	nodes: HashMap<String, Node>,
}

impl WeightedGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Ensures a node exists for `token`.
	///
	/// Idempotent: an existing node keeps its edges.
	pub fn add(&mut self, token: &str) {
		if !self.nodes.contains_key(token) {
			self.nodes.insert(token.to_owned(), Node::default());
		}
	}

	/// Increments the edge weight from `from` to `to`, creating it with
	/// weight 1 if absent.
	///
	/// Returns the new weight.
	///
	/// # Errors
	/// `ChainError::InvalidLinkSource` if `from` was never added. The graph
	/// is left unchanged.
	pub fn link(&mut self, from: &str, to: &str) -> Result<u64> {
		let node = self
			.nodes
			.get_mut(from)
			.ok_or_else(|| ChainError::InvalidLinkSource(from.to_owned()))?;
		Ok(node.add_transition(to))
	}

	/// True iff `token` is registered and has at least one outgoing edge.
	pub fn has_outgoing(&self, token: &str) -> bool {
		self.nodes.get(token).is_some_and(Node::has_outgoing)
	}

	pub fn node(&self, token: &str) -> Option<&Node> {
		self.nodes.get(token)
	}

	pub fn contains(&self, token: &str) -> bool {
		self.nodes.contains_key(token)
	}

	/// Weight of `from -> to`, 0 if either the node or the edge is missing.
	pub fn edge_weight(&self, from: &str, to: &str) -> u64 {
		self.nodes.get(from).map_or(0, |node| node.weight(to))
	}

	/// Number of registered tokens.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of distinct edges.
	pub fn edge_count(&self) -> usize {
		self.nodes.values().map(Node::degree).sum()
	}

	/// Merges another graph into this one.
	///
	/// Nodes missing here are cloned, existing ones have their edge
	/// weights summed.
	pub fn merge(&mut self, other: &Self) {
		for (token, node) in &other.nodes {
			if let Some(existing) = self.nodes.get_mut(token) {
				existing.merge(node);
			} else {
				self.nodes.insert(token.clone(), node.clone());
			}
		}
	}
}
