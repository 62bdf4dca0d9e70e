//! dynquery command-line runner
//!
//! Evaluates a filter/sort/page/projection request against a JSON product
//! catalog and prints the resulting page.

mod catalog;
mod executor;
mod formatter;

use std::path::PathBuf;

use clap::Parser;
use dynquery_core::proto::SortSpec;
use dynquery_core::{EngineConfig, QueryEngine};
use formatter::OutputFormat;
use tracing::debug;

/// dynquery command-line runner
#[derive(Parser, Debug)]
#[command(name = "dynquery")]
#[command(version, about = "Run a dynquery request against a JSON catalog")]
pub struct Args {
    /// Catalog file: a JSON array of products
    #[arg(long)]
    pub catalog: PathBuf,

    /// Request file, or `-` to read from stdin
    #[arg(short = 'q', long)]
    pub query: PathBuf,

    /// Engine configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json", value_enum)]
    pub format: OutputFormat,

    /// Member to order by when the request's sort field does not resolve
    #[arg(long, default_value = "code")]
    pub sort_fallback: String,
}

fn main() {
    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    debug!(?config, "engine configured");

    let engine = QueryEngine::new(config);
    let request = executor::read_request(&args.query)?;
    let catalog = catalog::load_catalog(&args.catalog)?;
    let fallback = SortSpec::asc(args.sort_fallback);

    let page = executor::execute(&engine, catalog, &request, &fallback)?;
    println!("{}", formatter::format_page(&page, args.format)?);
    Ok(())
}
