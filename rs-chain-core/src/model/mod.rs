//! Word-level Markov chain: graph, ingestion, generation and locking.
//!
//! - Weighted transition graph (`WeightedGraph`) made of `Node`s
//! - Ingested text with its start tokens and counters (`Corpus`)
//! - Weighted random walk producing one sequence (`Walker`)
//! - The readers-writer lock shared by ingestion and generation (`AccessGuard`)

/// Text ingestion into the graph.
///
/// Tracks paragraph-initial tokens and corpus counters, and supports
/// parallel chunked building.
pub mod corpus;

/// Weighted word-transition graph.
pub mod graph;

/// Readers-writer lock bound to one corpus.
pub mod guard;

/// Outgoing transitions of a single token.
pub mod node;

/// Weighted random walk over the graph.
pub mod walker;

pub use corpus::{Corpus, CorpusStats};
pub use graph::WeightedGraph;
pub use guard::AccessGuard;
pub use node::Node;
pub use walker::Walker;
