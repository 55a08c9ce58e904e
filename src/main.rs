//! Pagewalk main entry point
//!
//! This is the command-line interface for the Pagewalk listing crawler.

use clap::Parser;
use pagewalk::config::{load_config_with_hash, validate, Config};
use pagewalk::crawler::Coordinator;
use pagewalk::output::{print_statistics, DetailSink, JsonLinesSink, LogSink};
use pagewalk::CrawlError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pagewalk: a two-stage listing crawler
///
/// Pagewalk walks the pages of a paginated listing site, follows every
/// listed item, and reports the title of each item page.
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(version)]
#[command(about = "A two-stage listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the listing site root
    #[arg(long, value_name = "URL")]
    root_url: Option<String>,

    /// Override the per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Write each detail to stdout as a JSON line
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    tracing::info!(workers, "start crawler application");
    tracing::info!(url = %config.site.root_url, "target site");

    let result = if cli.json {
        run(config, &mut JsonLinesSink::new(std::io::stdout()), cli.quiet).await
    } else {
        run(config, &mut LogSink, cli.quiet).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CrawlError::Interrupted) => ExitCode::from(130),
        Err(e) => {
            match e.stage() {
                Some(stage) => tracing::error!(stage = %stage, "Crawl failed: {}", e),
                None => tracing::error!("Crawl failed: {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout stays free for `--json` output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagewalk=info,warn"),
            1 => EnvFilter::new("pagewalk=debug,info"),
            2 => EnvFilter::new("pagewalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load(cli: &Cli) -> Result<Config, CrawlError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(root_url) = &cli.root_url {
        config.site.root_url = root_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetch.timeout_ms = timeout_ms;
    }
    if let Some(max_pages) = cli.max_pages {
        config.pipeline.max_pages = max_pages;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
async fn run<S: DetailSink>(config: Config, sink: &mut S, quiet: bool) -> Result<(), CrawlError> {
    let coordinator = Coordinator::new(config)?;

    let shutdown = coordinator.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            shutdown.cancel();
        }
    });

    let stats = coordinator.run(sink).await?;
    if !quiet {
        print_statistics(&stats);
    }
    Ok(())
}
