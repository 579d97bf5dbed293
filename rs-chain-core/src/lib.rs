//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - A weighted word-transition graph learned from plain text
//! - Paragraph-by-paragraph ingestion, sequential or parallel
//! - Generation by weighted random walk from a paragraph-initial word
//! - A readers-writer guard letting ingestion and generation interleave
//!
//! Text is read one paragraph per line, tokens are runs of non-whitespace.

/// Graph model, ingestion, generation and locking.
pub mod model;

/// Error taxonomy shared by the whole crate.
pub mod error;

/// Line reading helpers.
pub mod io;

pub use error::{ChainError, Result};
pub use model::{AccessGuard, Corpus, CorpusStats, Node, WeightedGraph, Walker};
