//! perfdash: performance metrics dashboard for continuous activity recognition
//!
//! Reads a precomputed results snapshot (frame-level and event-level scores
//! plus time-interval data) and renders it as an HTML/SVG dashboard, either
//! to a file or served over HTTP.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

mod axis;
mod ead;
mod render;
mod results;
#[cfg(feature = "serve")]
mod serve;
mod summary;
mod tracks;

/// Performance metrics dashboard for continuous activity recognition
#[derive(Parser, Debug)]
#[command(name = "perfdash")]
#[command(version)]
#[command(about = "Render activity-recognition scoring results as an HTML/SVG dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a results snapshot to a standalone HTML file
    Render(RenderArgs),

    /// Serve the dashboard over HTTP
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Results snapshot (scores JSON, optionally gzipped)
    #[arg(short, long)]
    results: PathBuf,

    /// Output HTML file
    #[arg(short, long, default_value = "dashboard.html")]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "serve")]
#[derive(Parser, Debug)]
struct ServeArgs {
    /// Results snapshot (scores JSON, optionally gzipped)
    #[arg(short, long)]
    results: PathBuf,

    /// Port for the web server
    #[arg(long, default_value = "8765")]
    port: u16,

    /// Do not open the browser automatically
    #[arg(long)]
    no_browser: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(args),
        #[cfg(feature = "serve")]
        Commands::Serve(args) => run_serve(args),
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn run_render(args: RenderArgs) -> Result<()> {
    init_logging(args.verbose);

    info!("perfdash render v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading results: {}", args.results.display());

    let doc = results::load_results(&args.results)?;
    info!(
        "Loaded {} cases ({} truths, {} detected)",
        doc.results.len(),
        doc.stats.truth_count,
        doc.stats.detected_count
    );

    let html = render::dashboard_html(&doc);
    std::fs::write(&args.output, html)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("Dashboard written to: {}", args.output.display());

    Ok(())
}

#[cfg(feature = "serve")]
fn run_serve(args: ServeArgs) -> Result<()> {
    init_logging(args.verbose);

    info!("perfdash serve v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading results: {}", args.results.display());

    let raw = results::read_snapshot(&args.results)?;
    let doc: results::ResultsDoc = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse results file: {}", args.results.display()))?;
    serve::start_server(&doc, &raw, args.port, !args.no_browser)
}
