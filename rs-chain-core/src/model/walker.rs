use std::io::Write;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::graph::WeightedGraph;
use super::node::Node;
use crate::error::{ChainError, Result};

/// Weighted random walk over a [`WeightedGraph`].
///
/// A walker borrows the graph read-only and owns only its random source
/// and its cursor. One walk emits the seed, then repeatedly moves to a
/// successor picked with probability proportional to the edge weight,
/// until it reaches a token with no outgoing edge.
///
/// # Output
/// Every token is followed by a single space, the sequence is ended by a
/// newline: `"the cat sat \n"`.
///
/// # Termination
/// A walk only stops on a sink. If every token reachable from the seed
/// has a successor, `walk` never returns unless writing fails.
pub struct Walker<'g, R = StdRng> {
	graph: &'g WeightedGraph,
	rng: R,
	cursor: Option<String>,
}

impl<'g> Walker<'g, StdRng> {
	/// Creates a walker with a fresh `StdRng` seeded from the thread RNG.
	pub fn new(graph: &'g WeightedGraph) -> Self {
		Self::with_rng(graph, StdRng::from_rng(&mut rand::rng()))
	}
}

impl<'g, R: Rng> Walker<'g, R> {
	/// Creates a walker drawing from `rng`.
	///
	/// Used with a seeded RNG to get reproducible walks.
	pub fn with_rng(graph: &'g WeightedGraph, rng: R) -> Self {
		Self { graph, rng, cursor: None }
	}

	/// Sets the cursor to `token`.
	pub fn seed(&mut self, token: impl Into<String>) {
		self.cursor = Some(token.into());
	}

	pub fn is_seeded(&self) -> bool {
		self.cursor.is_some()
	}

	/// Picks one candidate uniformly at random.
	///
	/// Returns `None` if `candidates` is empty.
	pub fn pick_random<'c>(&mut self, candidates: &'c [String]) -> Option<&'c str> {
		candidates.choose(&mut self.rng).map(String::as_str)
	}

	/// Seeds the walker with a token picked uniformly from `starts`.
	///
	/// # Errors
	/// `ChainError::EmptySeedSet` if `starts` is empty.
	pub fn seed_from(&mut self, starts: &[String]) -> Result<()> {
		let token = self.pick_random(starts).ok_or(ChainError::EmptySeedSet)?;
		self.cursor = Some(token.to_owned());
		Ok(())
	}

	/// Picks a successor of `node` with probability proportional to its
	/// edge weight.
	///
	/// Draws `n` uniformly in `[0, total)` and returns the successor whose
	/// cumulative bucket contains it, buckets being laid out in
	/// lexicographic successor order (see [`Node::successor_at`]).
	///
	/// # Panics
	/// If `node` has no outgoing edge, or if no bucket matches the draw.
	/// Both mean the caller or the weight bookkeeping is broken.
	pub fn weighted_next(&mut self, node: &'g Node) -> &'g str {
		let total = node.total_weight();
		assert!(total > 0, "weighted_next called on a node without outgoing edges");

		let n = self.rng.random_range(0..total);
		match node.successor_at(n) {
			Some(token) => token,
			None => panic!("draw {n} is outside the cumulative weights of a node totalling {total}"),
		}
	}

	/// Walks the graph from the seeded token, writing every visited token
	/// to `out`.
	///
	/// Returns the number of tokens emitted. The cursor is cleared in all
	/// cases, so the walker must be seeded again before the next walk.
	///
	/// # Errors
	/// - `ChainError::NotSeeded` if `seed` was not called
	/// - `ChainError::SinkWrite` as soon as a write to `out` fails
	pub fn walk<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<usize> {
		let seed = self.cursor.take().ok_or(ChainError::NotSeeded)?;
		let graph = self.graph;

		let mut current: &str = &seed;
		let mut emitted = 0;
		loop {
			write!(out, "{current} ").map_err(ChainError::SinkWrite)?;
			emitted += 1;
			match graph.node(current) {
				Some(node) if node.has_outgoing() => current = self.weighted_next(node),
				_ => break,
			}
		}
		writeln!(out).map_err(ChainError::SinkWrite)?;

		trace!(seed = %seed, tokens = emitted, "walk finished");
		Ok(emitted)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::io;

	use super::*;

	/// Accepts `limit` writes, then fails like a closed connection.
	struct ClosingSink {
		written: Vec<u8>,
		limit: usize,
	}

	impl Write for ClosingSink {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			if self.limit == 0 {
				return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
			}
			self.limit -= 1;
			self.written.extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	fn graph(edges: &[(&str, &str, u64)]) -> WeightedGraph {
		let mut graph = WeightedGraph::new();
		for (from, to, weight) in edges {
			graph.add(from);
			for _ in 0..*weight {
				graph.link(from, to).unwrap();
			}
		}
		graph
	}

	fn rng() -> StdRng {
		StdRng::seed_from_u64(42)
	}

	#[test]
	fn walk_without_seed_fails() {
		let graph = graph(&[("a", "b", 1)]);
		let mut walker = Walker::with_rng(&graph, rng());
		let mut out = Vec::new();

		assert!(matches!(walker.walk(&mut out), Err(ChainError::NotSeeded)));
		assert!(out.is_empty());
	}

	#[test]
	fn sink_seed_emits_one_token() {
		let mut graph = graph(&[("a", "b", 1)]);
		graph.add("alone");
		let mut walker = Walker::with_rng(&graph, rng());

		for seed in ["alone", "b", "never-ingested"] {
			let mut out = Vec::new();
			walker.seed(seed);
			assert_eq!(walker.walk(&mut out).unwrap(), 1);
			assert_eq!(String::from_utf8(out).unwrap(), format!("{seed} \n"));
		}
	}

	#[test]
	fn walk_clears_the_cursor() {
		let graph = graph(&[("a", "b", 1)]);
		let mut walker = Walker::with_rng(&graph, rng());
		walker.seed("a");
		assert!(walker.is_seeded());

		let mut out = Vec::new();
		walker.walk(&mut out).unwrap();
		assert_eq!(out, b"a b \n");
		assert!(!walker.is_seeded());
		assert!(matches!(walker.walk(&mut out), Err(ChainError::NotSeeded)));
	}

	#[test]
	fn weighted_next_stays_within_successors() {
		let graph = graph(&[("a", "b", 2), ("a", "c", 5), ("a", "d", 1)]);
		let node = graph.node("a").unwrap();
		let mut walker = Walker::with_rng(&graph, rng());

		for _ in 0..500 {
			let next = walker.weighted_next(node);
			assert!(node.weight(next) > 0, "{next} is not a successor of a");
		}
	}

	#[test]
	fn weighted_next_follows_weights() {
		let graph = graph(&[("a", "rare", 1), ("a", "common", 9)]);
		let node = graph.node("a").unwrap();
		let mut walker = Walker::with_rng(&graph, rng());

		let mut counts: HashMap<&str, usize> = HashMap::new();
		for _ in 0..10_000 {
			*counts.entry(walker.weighted_next(node)).or_default() += 1;
		}
		let common = counts["common"];
		assert!((8_500..=9_500).contains(&common), "common picked {common} times");
	}

	#[test]
	fn seeded_walks_are_reproducible() {
		let graph = graph(&[("a", "b", 1), ("a", "c", 1), ("b", "a", 1), ("b", "d", 2)]);
		let run = || {
			let mut walker = Walker::with_rng(&graph, StdRng::seed_from_u64(7));
			let mut out = Vec::new();
			for _ in 0..20 {
				walker.seed("a");
				walker.walk(&mut out).unwrap();
			}
			out
		};
		assert_eq!(run(), run());
	}

	#[test]
	#[should_panic(expected = "without outgoing edges")]
	fn weighted_next_on_sink_is_fatal() {
		let graph = graph(&[]);
		let sink = Node::default();
		let mut walker = Walker::with_rng(&graph, rng());
		walker.weighted_next(&sink);
	}

	#[test]
	fn cycle_walks_until_the_sink_fails() {
		// Every reachable node has a successor, only the failing sink ends the walk
		let graph = graph(&[("tick", "tock", 1), ("tock", "tick", 1)]);
		let mut walker = Walker::with_rng(&graph, rng());
		let mut sink = ClosingSink { written: Vec::new(), limit: 1_000 };

		walker.seed("tick");
		let err = walker.walk(&mut sink).unwrap_err();
		assert!(matches!(err, ChainError::SinkWrite(ref source) if source.kind() == io::ErrorKind::BrokenPipe));
		assert!(!walker.is_seeded());

		let text = String::from_utf8(sink.written).unwrap();
		let tokens: Vec<&str> = text.split_whitespace().collect();
		assert!(tokens.len() >= 100);
		for pair in tokens.windows(2) {
			assert_ne!(pair[0], pair[1]);
		}
		assert!(!text.contains('\n'));
	}

	#[test]
	fn first_write_failure_aborts() {
		let graph = graph(&[("a", "b", 1)]);
		let mut walker = Walker::with_rng(&graph, rng());
		let mut sink = ClosingSink { written: Vec::new(), limit: 0 };

		walker.seed("a");
		assert!(matches!(walker.walk(&mut sink), Err(ChainError::SinkWrite(_))));
		assert!(sink.written.is_empty());
	}

	#[test]
	fn seed_from_picks_a_start_token() {
		let graph = graph(&[("a", "b", 1)]);
		let mut walker = Walker::with_rng(&graph, rng());
		let starts = vec!["a".to_owned(), "b".to_owned()];

		for _ in 0..50 {
			let picked = walker.pick_random(&starts).unwrap();
			assert!(starts.iter().any(|s| s == picked));
		}
		assert_eq!(walker.pick_random(&[]), None);
		assert!(matches!(walker.seed_from(&[]), Err(ChainError::EmptySeedSet)));

		walker.seed_from(&starts).unwrap();
		assert!(walker.is_seeded());
	}
}
