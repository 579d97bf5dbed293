use std::io::{BufRead, Write};
use std::thread;

use rand::Rng;
use tracing::debug;

use super::graph::WeightedGraph;
use super::walker::Walker;
use crate::error::{ChainError, Result};
use crate::io::lines_lossy;

/// Running counters of an ingested corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorpusStats {
	/// Non-blank lines ingested.
	pub paragraphs: u64,
	/// Tokens ingested, repeats included.
	pub tokens: u64,
	/// Distinct registered tokens.
	pub vertices: usize,
	/// Distinct edges.
	pub edges: usize,
}

/// Everything learned from the ingested text.
///
/// This struct manages:
/// - `graph`: the weighted word-transition graph
/// - `starts`: the first token of every paragraph, in ingestion order,
///   repeats included so that frequent openers are picked more often
/// - `paragraphs` and `tokens`: counters used to derive a default output length
///
/// Nothing is ever removed: ingestion only adds nodes, edge weight,
/// start tokens and counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
	graph: WeightedGraph,
	starts: Vec<String>,
	paragraphs: u64,
	tokens: u64,
}

impl Corpus {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn graph(&self) -> &WeightedGraph {
		&self.graph
	}

	/// First token of every ingested paragraph, in order.
	pub fn start_tokens(&self) -> &[String] {
		&self.starts
	}

	pub fn is_empty(&self) -> bool {
		self.paragraphs == 0
	}

	pub fn stats(&self) -> CorpusStats {
		CorpusStats {
			paragraphs: self.paragraphs,
			tokens: self.tokens,
			vertices: self.graph.len(),
			edges: self.graph.edge_count(),
		}
	}

	/// Average number of tokens per paragraph (integer division).
	///
	/// # Errors
	/// `ChainError::EmptyCorpus` if no paragraph was ingested.
	pub fn avg_len(&self) -> Result<u64> {
		self.tokens.checked_div(self.paragraphs).ok_or(ChainError::EmptyCorpus)
	}

	/// Adds one line of text to the corpus.
	///
	/// # Behavior
	/// - Splits the line on whitespace
	/// - Registers every token in the graph
	/// - Links each token to the one following it
	/// - Records the first token as a start token
	///
	/// Returns `false`, and changes nothing, if the line holds no token.
	pub fn ingest_paragraph(&mut self, line: &str) -> bool {
		let mut tokens = line.split_whitespace();
		let Some(first) = tokens.next() else {
			return false;
		};

		self.graph.add(first);
		self.starts.push(first.to_owned());
		self.tokens += 1;

		let mut previous = first;
		for token in tokens {
			self.graph.add(token);
			// `previous` was added on the previous iteration
			if let Err(err) = self.graph.link(previous, token) {
				unreachable!("ingestion linked from an unregistered token: {err}");
			}
			previous = token;
			self.tokens += 1;
		}

		self.paragraphs += 1;
		true
	}

	/// Ingests every line of `reader`, one paragraph per non-blank line.
	///
	/// Returns the number of paragraphs added.
	///
	/// # Errors
	/// `ChainError::SourceRead` if reading fails. Paragraphs read before
	/// the failure stay in the corpus.
	pub fn ingest_reader<R: BufRead>(&mut self, reader: R) -> Result<u64> {
		let before = self.paragraphs;
		for line in lines_lossy(reader) {
			let line = line.map_err(ChainError::SourceRead)?;
			self.ingest_paragraph(&line);
		}

		let added = self.paragraphs - before;
		debug!(paragraphs = added, vertices = self.graph.len(), "ingested reader");
		Ok(added)
	}

	/// Builds a corpus from `lines` using one thread per chunk.
	///
	/// # Behavior
	/// - Splits the lines into chunks (based on CPU cores * factor)
	/// - Spawns threads to build a partial corpus for each chunk
	/// - Merges the partial corpora in chunk order
	///
	/// The result is identical to ingesting `lines` one by one, start
	/// tokens included.
	///
	/// # Errors
	/// `ChainError::WorkerPanicked` if a worker thread panicked.
	pub fn build_parallel(lines: &[String]) -> Result<Self> {
		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);

		let mut workers = Vec::new();
		for chunk in lines.chunks(chunk_size) {
			let chunk: Vec<String> = chunk.to_vec();

			workers.push(thread::spawn(move || {
				let mut partial = Corpus::default();
				for line in &chunk {
					partial.ingest_paragraph(line);
				}
				partial
			}));
		}
		debug!(lines = lines.len(), workers = workers.len(), "parallel ingestion started");

		let mut corpus = Corpus::default();
		for worker in workers {
			let partial = worker.join().map_err(|_| ChainError::WorkerPanicked)?;
			corpus.merge(partial);
		}

		Ok(corpus)
	}

	/// Merges another corpus into this one.
	///
	/// # Behavior
	/// - Sums edge weights of the graphs
	/// - Appends `other`'s start tokens after this corpus' ones
	/// - Adds the counters
	pub fn merge(&mut self, other: Corpus) {
		self.graph.merge(&other.graph);
		self.starts.extend(other.starts);
		self.paragraphs += other.paragraphs;
		self.tokens += other.tokens;
	}

	/// Writes `lines` generated sequences to `out`, using a fresh walker.
	///
	/// # Errors
	/// - `ChainError::EmptySeedSet` if nothing was ingested and `lines > 0`
	/// - `ChainError::SinkWrite` if writing fails
	pub fn generate<W: Write + ?Sized>(&self, out: &mut W, lines: u64) -> Result<()> {
		self.generate_with(Walker::new(&self.graph), out, lines)
	}

	/// Same as [`Corpus::generate`] with a caller-provided walker.
	///
	/// Each line is seeded with a token picked uniformly from the start
	/// tokens, then walked until a sink.
	pub fn generate_with<R: Rng, W: Write + ?Sized>(
		&self,
		mut walker: Walker<'_, R>,
		out: &mut W,
		lines: u64,
	) -> Result<()> {
		for _ in 0..lines {
			walker.seed_from(&self.starts)?;
			walker.walk(out)?;
		}
		Ok(())
	}
}
