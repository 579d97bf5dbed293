use actix_multipart::MultipartError;
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use rs_chain_core::ChainError;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a request, rendered as a plain-text error response.
#[derive(Error, Debug)]
pub enum ServerError {
	#[error(transparent)]
	Chain(#[from] ChainError),

	/// The upload body is not valid multipart or a part could not be read.
	#[error("invalid upload: {0}")]
	Multipart(#[from] MultipartError),

	#[error("only POST or GET handled, got {0}")]
	UnsupportedMethod(Method),
}

impl ServerError {
	/// True if the failure comes from a bug on our side, not from the request.
	pub fn is_invariant_violation(&self) -> bool {
		matches!(self, ServerError::Chain(err) if err.is_invariant_violation())
	}

	/// Logs a failed `action`, at `error` level for invariant violations.
	pub fn report(&self, action: &'static str) {
		if self.is_invariant_violation() {
			error!(err = %self, action, "internal invariant broken");
		} else {
			warn!(err = %self, action, "request failed");
		}
	}
}

impl ResponseError for ServerError {
	fn status_code(&self) -> StatusCode {
		match self {
			ServerError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
			ServerError::Multipart(_) => StatusCode::BAD_REQUEST,
			ServerError::Chain(ChainError::EmptySeedSet) => StatusCode::SERVICE_UNAVAILABLE,
			ServerError::Chain(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		// Invariant details stay in the logs
		let message = if self.is_invariant_violation() {
			"internal server error".to_owned()
		} else {
			self.to_string()
		};
		HttpResponse::build(self.status_code())
			.content_type("text/plain; charset=utf-8")
			.body(message)
	}
}
