use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rs_chain_core::io::read_file;
use rs_chain_core::{AccessGuard, Corpus};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Generates text from a word-level Markov chain learned on the input.
///
/// Input is read one paragraph per line. Each output line starts with a
/// word that opened some input paragraph.
#[derive(Parser, Debug)]
#[command(name = "rs-chain", version)]
struct Args {
	/// Number `N` of lines to output. Default is the average paragraph length of the input
	#[arg(short = 'n', long, value_name = "N")]
	lines: Option<u64>,

	/// Input files, `-` or no file reads standard input
	#[arg(value_name = "FILE")]
	files: Vec<PathBuf>,

	/// Log ingestion details to stderr
	#[arg(short, long)]
	verbose: bool,
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "rs_chain=debug,rs_chain_core=debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.init();
}

fn is_stdin(path: &Path) -> bool {
	path.as_os_str() == "-"
}

/// Ingests every input into `guard`, in order.
///
/// Standard input is streamed; files are read whole and built in parallel.
/// The exclusive lock is held for the whole read of each input.
fn ingest_inputs(guard: &AccessGuard, files: &[PathBuf]) -> Result<()> {
	if files.is_empty() {
		guard.ingest(io::stdin().lock()).context("reading standard input")?;
		return Ok(());
	}

	for path in files {
		if is_stdin(path) {
			guard.ingest(io::stdin().lock()).context("reading standard input")?;
			continue;
		}

		let mut corpus = guard.blocking_exclusive();
		let lines = read_file(path).with_context(|| format!("reading {}", path.display()))?;
		let partial = Corpus::build_parallel(&lines)?;
		debug!(file = %path.display(), paragraphs = partial.stats().paragraphs, "ingested file");
		corpus.merge(partial);
	}
	Ok(())
}

/// Number of lines to output: the requested count, or the average
/// paragraph length of everything ingested.
fn line_count(requested: Option<u64>, corpus: &Corpus) -> Result<u64> {
	match requested {
		Some(lines) => Ok(lines),
		None => corpus.avg_len().context("nothing to generate from"),
	}
}

fn run(args: &Args) -> Result<()> {
	let guard = AccessGuard::default();
	ingest_inputs(&guard, &args.files)?;

	let corpus = guard.blocking_shared();
	let stats = corpus.stats();
	info!(paragraphs = stats.paragraphs, tokens = stats.tokens, vertices = stats.vertices, "input ingested");

	let lines = line_count(args.lines, &corpus)?;
	let mut out = BufWriter::new(io::stdout().lock());
	corpus.generate(&mut out, lines).context("generating text")?;
	out.flush().context("writing generated text")?;
	Ok(())
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_tracing(args.verbose);

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("rs-chain: {err:#}");
			ExitCode::FAILURE
		}
	}
}
