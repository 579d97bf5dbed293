use std::io::{self, Write};

use actix_web::web::Bytes;
use futures_util::{Stream, stream};
use tokio::sync::mpsc;

/// Chunks buffered between the writer and the connection.
const CHUNKS_IN_FLIGHT: usize = 4;

/// Blocking writer feeding a streamed response body.
///
/// Each `write` sends one chunk and waits while the channel is full, so a
/// slow client slows the writer down. Once the body is dropped, e.g. on
/// client disconnect, every write fails with `BrokenPipe`.
///
/// Must be used from a blocking thread, never from an async task.
pub struct ChannelWriter {
	tx: mpsc::Sender<Bytes>,
}

impl Write for ChannelWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.tx
			.blocking_send(Bytes::copy_from_slice(buf))
			.map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Creates a writer and the response body it feeds.
///
/// The body ends once the writer is dropped.
pub fn channel() -> (ChannelWriter, impl Stream<Item = io::Result<Bytes>> + 'static) {
	let (tx, rx) = mpsc::channel(CHUNKS_IN_FLIGHT);
	let body = stream::unfold(rx, |mut rx| async move {
		let chunk = rx.recv().await?;
		Some((Ok::<_, io::Error>(chunk), rx))
	});
	(ChannelWriter { tx }, body)
}

#[cfg(test)]
mod tests {
	use actix_web::web;
	use futures_util::TryStreamExt;

	use super::*;

	#[actix_web::test]
	async fn chunks_reach_the_body_in_order() {
		let (mut writer, body) = channel();
		let writes = web::block(move || {
			writer.write_all(b"the cat ")?;
			writer.write_all(b"sat \n")
		});

		let chunks: Vec<Bytes> = body.try_collect().await.unwrap();
		writes.await.unwrap().unwrap();
		assert_eq!(chunks.concat(), b"the cat sat \n");
	}

	#[actix_web::test]
	async fn writes_fail_once_the_body_is_dropped() {
		let (mut writer, body) = channel();
		drop(body);

		let err = web::block(move || writer.write_all(b"too late")).await.unwrap().unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
	}
}
