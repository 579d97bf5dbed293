use std::io::{BufWriter, Write};

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::TryStreamExt;
use rs_chain_core::io::LineBuffer;
use rs_chain_core::{AccessGuard, ChainError, Corpus};
use tracing::{debug, error, info, warn};

use crate::body::{self, ChannelWriter};
use crate::error::ServerError;

/// Registers the `/` resource.
///
/// `GET` generates, `POST` ingests, any other method is rejected with 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(
		web::resource("/")
			.route(web::get().to(get_generated))
			.route(web::post().to(post_corpus))
			.default_service(web::to(unsupported_method)),
	);
}

/// HTTP GET endpoint `/`
///
/// Picks a start token and streams one walk as plain text.
///
/// # Notes
/// - The walk runs on the blocking pool and owns the shared guard, so the
///   lock is held until the last token was handed to the connection
/// - Once the response started, a failure can only cut the body short: a
///   client that goes away ends the walk on the next write
async fn get_generated(guard: web::Data<AccessGuard>) -> Result<HttpResponse, ServerError> {
	let corpus = guard.shared_owned().await;
	if corpus.start_tokens().is_empty() {
		let err = ServerError::from(ChainError::EmptySeedSet);
		err.report("generate");
		return Err(err);
	}

	let (writer, body) = body::channel();
	let walk = web::block(move || write_walk(&corpus, writer));
	actix_web::rt::spawn(async move {
		match walk.await {
			Ok(Ok(())) => debug!("walk streamed"),
			Ok(Err(err)) => ServerError::from(err).report("generate"),
			Err(err) => error!(%err, "walk aborted"),
		}
	});

	Ok(HttpResponse::Ok()
		.content_type("text/plain; charset=utf-8")
		.streaming(body))
}

/// Writes one walk of `corpus` to `writer`, then flushes it.
fn write_walk(corpus: &Corpus, writer: ChannelWriter) -> Result<(), ChainError> {
	let mut out = BufWriter::new(writer);
	corpus.generate(&mut out, 1)?;
	out.flush().map_err(ChainError::SinkWrite)
}

/// HTTP POST endpoint `/`
///
/// Ingests every uploaded file of a multipart body, in upload order.
/// Responds with an empty body on success.
async fn post_corpus(guard: web::Data<AccessGuard>, payload: Multipart) -> Result<HttpResponse, ServerError> {
	ingest_upload(&guard, payload)
		.await
		.inspect_err(|err| err.report("upload"))?;
	Ok(HttpResponse::Ok().finish())
}

/// Reads the multipart stream under exclusive access.
///
/// Parts without a filename, or with an empty one, are plain form fields:
/// they are drained and ignored. File parts are ingested line by line as
/// their chunks arrive. A failure keeps every line completed before it.
async fn ingest_upload(guard: &AccessGuard, mut payload: Multipart) -> Result<(), ServerError> {
	let mut corpus = guard.exclusive().await;
	let mut files = 0;

	while let Some(mut field) = payload.try_next().await? {
		let filename = field
			.content_disposition()
			.and_then(|disposition| disposition.get_filename())
			.filter(|name| !name.is_empty())
			.map(str::to_owned);

		let Some(filename) = filename else {
			while field.try_next().await?.is_some() {}
			debug!("skipped form field without filename");
			continue;
		};

		let mut lines = LineBuffer::new();
		let mut paragraphs = 0u64;
		while let Some(chunk) = field.try_next().await? {
			for line in lines.push(&chunk) {
				paragraphs += u64::from(corpus.ingest_paragraph(&line));
			}
		}
		if let Some(line) = lines.finish() {
			paragraphs += u64::from(corpus.ingest_paragraph(&line));
		}
		files += 1;
		debug!(file = %filename, paragraphs, "ingested upload");
	}

	let stats = corpus.stats();
	info!(
		files,
		paragraphs = stats.paragraphs,
		tokens = stats.tokens,
		vertices = stats.vertices,
		"corpus updated"
	);
	Ok(())
}

async fn unsupported_method(req: HttpRequest) -> Result<HttpResponse, ServerError> {
	let err = ServerError::UnsupportedMethod(req.method().clone());
	warn!(%err, path = req.path(), "rejected request");
	Err(err)
}

/// Fallback for every path other than `/`.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
	warn!(path = req.path(), "invalid request");
	HttpResponse::NotFound()
		.content_type("text/plain; charset=utf-8")
		.body("404 page not found\n")
}
