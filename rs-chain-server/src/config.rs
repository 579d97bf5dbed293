use clap::{Parser, ValueEnum};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	Pretty,
	Json,
}

/// HTTP service serving a word-level Markov chain.
///
/// `POST /` uploads corpora as multipart files, `GET /` generates one line.
#[derive(Parser, Debug)]
#[command(name = "rs-chain-server", version)]
pub struct Config {
	/// Address to bind
	#[arg(long, env = "RS_CHAIN_HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Port to bind
	#[arg(long, env = "RS_CHAIN_PORT", default_value_t = 5000)]
	pub port: u16,

	/// Allow cross-origin requests from any origin
	#[arg(long, env = "RS_CHAIN_CORS")]
	pub cors: bool,

	/// Log output format
	#[arg(long, env = "RS_CHAIN_LOG_FORMAT", value_enum, default_value = "pretty")]
	pub log_format: LogFormat,
}

/// Installs the global tracing subscriber, filtered by `RUST_LOG`.
///
/// actix's `Logger` middleware writes through the `log` facade, which
/// this subscriber also captures.
pub fn init_tracing(format: LogFormat) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| "rs_chain_server=info,rs_chain_core=info,actix_web=info".into());

	match format {
		LogFormat::Pretty => tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_target(true))
			.init(),
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(
				fmt::layer()
					.json()
					.with_target(true)
					.with_span_events(FmtSpan::CLOSE)
					.flatten_event(true),
			)
			.init(),
	}
}
