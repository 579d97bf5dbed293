use actix_cors::Cors;
use actix_web::middleware::{Condition, Logger};
use actix_web::{App, HttpServer, web};
use clap::Parser;
use rs_chain_core::AccessGuard;
use tracing::info;

use config::{Config, init_tracing};

mod body;
mod config;
mod error;
mod routes;

/// Main entry point for the server.
///
/// Builds an empty chain, wraps it in its `AccessGuard` and starts an
/// Actix-web HTTP server exposing it on `/`.
///
/// # Notes
/// - The chain lives in memory only and starts empty on every launch.
/// - Uploads take the guard exclusively, generation takes it shared.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config = Config::parse();
	init_tracing(config.log_format);

	let guard = web::Data::new(AccessGuard::default());
	let cors = config.cors;
	info!(host = %config.host, port = config.port, cors, "starting server");

	HttpServer::new(move || {
		App::new()
			.app_data(guard.clone())
			.wrap(Condition::new(cors, Cors::permissive()))
			.wrap(Logger::default())
			.configure(routes::configure)
			.default_service(web::to(routes::not_found))
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
