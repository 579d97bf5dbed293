use std::io::{BufRead, Write};
use std::sync::Arc;

use tokio::sync::{OwnedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::corpus::{Corpus, CorpusStats};
use crate::error::Result;

/// The single readers-writer lock guarding one [`Corpus`].
///
/// Ingestion takes the lock exclusively for its whole duration, reading
/// included. Generation takes it shared for its whole duration, sink
/// writes included. A slow reader or writer therefore holds the lock open
/// for as long as it is slow.
///
/// The lock is `tokio`'s: async callers suspend on `.await` instead of
/// blocking their worker, synchronous callers use the `blocking_*`
/// methods, which must not be called from within an async runtime.
/// [`AccessGuard::shared_owned`] hands out a guard that can leave the
/// caller's scope, e.g. to finish a walk on a blocking thread.
#[derive(Debug, Default)]
pub struct AccessGuard {
	corpus: Arc<RwLock<Corpus>>,
}

impl AccessGuard {
	pub fn new(corpus: Corpus) -> Self {
		Self { corpus: Arc::new(RwLock::new(corpus)) }
	}

	/// Waits for exclusive access.
	pub async fn exclusive(&self) -> RwLockWriteGuard<'_, Corpus> {
		self.corpus.write().await
	}

	/// Waits for shared access.
	pub async fn shared(&self) -> RwLockReadGuard<'_, Corpus> {
		self.corpus.read().await
	}

	/// Waits for shared access and returns a `'static` guard.
	///
	/// The lock stays held until the returned guard is dropped, wherever it
	/// was moved to.
	pub async fn shared_owned(&self) -> OwnedRwLockReadGuard<Corpus> {
		Arc::clone(&self.corpus).read_owned().await
	}

	/// Blocks the current thread until exclusive access is granted.
	pub fn blocking_exclusive(&self) -> RwLockWriteGuard<'_, Corpus> {
		self.corpus.blocking_write()
	}

	/// Blocks the current thread until shared access is granted.
	pub fn blocking_shared(&self) -> RwLockReadGuard<'_, Corpus> {
		self.corpus.blocking_read()
	}

	/// Ingests `reader` under exclusive access.
	///
	/// Returns the number of paragraphs added.
	pub fn ingest<R: BufRead>(&self, reader: R) -> Result<u64> {
		let mut corpus = self.blocking_exclusive();
		corpus.ingest_reader(reader)
	}

	/// Writes `lines` generated sequences to `out` under shared access.
	pub fn generate<W: Write + ?Sized>(&self, out: &mut W, lines: u64) -> Result<()> {
		let corpus = self.blocking_shared();
		debug!(lines, "generating");
		corpus.generate(out, lines)
	}

	pub fn stats(&self) -> CorpusStats {
		self.blocking_shared().stats()
	}

	/// Consumes the guard and returns the corpus.
	///
	/// Returns `None` while a guard from [`AccessGuard::shared_owned`] is
	/// still alive.
	pub fn into_inner(self) -> Option<Corpus> {
		Arc::into_inner(self.corpus).map(RwLock::into_inner)
	}
}
