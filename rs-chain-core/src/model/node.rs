use std::collections::BTreeMap;

/// Outgoing transitions of one token in the word graph.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during ingestion
/// - Map a draw in `[0, total_weight)` to a successor
/// - Merge with the node of the same token from another graph
///
/// ## Invariants
/// - Each transition weight is strictly positive
/// - Successors iterate in lexicographic order, which fixes the
///   bucket layout used by [`Node::successor_at`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
	/// Outgoing transitions indexed by the successor token.
	/// Example: { "cat" => 42, "dog" => 3 }
	transitions: BTreeMap<String, u64>,
}

impl Node {
	/// Records an occurrence of a transition toward `to`.
	///
	/// Returns the new weight of that edge.
	pub fn add_transition(&mut self, to: &str) -> u64 {
		// Avoid allocating a key for edges that already exist
		if let Some(weight) = self.transitions.get_mut(to) {
			*weight += 1;
			return *weight;
		}
		self.transitions.insert(to.to_owned(), 1);
		1
	}

	/// True if at least one outgoing edge exists.
	pub fn has_outgoing(&self) -> bool {
		!self.transitions.is_empty()
	}

	/// Weight of the edge toward `to`, 0 if absent.
	pub fn weight(&self, to: &str) -> u64 {
		self.transitions.get(to).copied().unwrap_or(0)
	}

	/// Sum of all outgoing weights.
	pub fn total_weight(&self) -> u64 {
		self.transitions.values().sum()
	}

	/// Number of distinct successors.
	pub fn degree(&self) -> usize {
		self.transitions.len()
	}

	/// Successors with their weights, in lexicographic order.
	pub fn successors(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(token, weight)| (token.as_str(), *weight))
	}

	/// Returns the successor whose cumulative bucket contains `n`.
	///
	/// Buckets are laid out in successor order, each as wide as its weight:
	/// with `{ "a" => 1, "b" => 3 }`, `n = 0` maps to `"a"` and `1..4` to `"b"`.
	///
	/// Returns `None` if `n >= total_weight()`.
	pub fn successor_at(&self, n: u64) -> Option<&str> {
		let mut upper = 0;
		for (token, weight) in &self.transitions {
			upper += weight;
			if n < upper {
				return Some(token.as_str());
			}
		}
		None
	}

	/// Merges another node into this one.
	///
	/// Transition weights are summed.
	pub fn merge(&mut self, other: &Self) {
		for (token, weight) in &other.transitions {
			*self.transitions.entry(token.clone()).or_insert(0) += weight;
		}
	}
}
