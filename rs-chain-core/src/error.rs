use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

/// Failures surfaced by ingestion and generation.
///
/// Most variants are ordinary caller-facing conditions. `InvalidLinkSource`
/// and `WorkerPanicked` mean an internal invariant broke; use
/// [`ChainError::is_invariant_violation`] to tell them apart.
#[derive(Error, Debug)]
pub enum ChainError {
	/// `walk` was called without a prior `seed`.
	#[error("walker needs to be seeded")]
	NotSeeded,

	/// No start token is available, i.e. nothing was ingested yet.
	#[error("no corpus ingested yet")]
	EmptySeedSet,

	/// The average paragraph length is undefined for an empty corpus.
	#[error("cannot derive an output length from an empty corpus")]
	EmptyCorpus,

	#[error("writing generated text: {0}")]
	SinkWrite(#[source] io::Error),

	#[error("reading corpus: {0}")]
	SourceRead(#[source] io::Error),

	/// `link` was asked to start an edge from a token never registered with `add`.
	#[error("cannot link from unregistered token {0:?}")]
	InvalidLinkSource(String),

	#[error("an ingestion worker panicked")]
	WorkerPanicked,
}

impl ChainError {
	/// True for errors that indicate a bug rather than bad input or I/O.
	pub fn is_invariant_violation(&self) -> bool {
		matches!(self, ChainError::InvalidLinkSource(_) | ChainError::WorkerPanicked)
	}
}
