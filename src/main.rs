//! Section-Harvest main entry point
//!
//! This is the command-line interface for the Section-Harvest corpus crawler.

use anyhow::Context;
use clap::Parser;
use section_harvest::config::{compute_config_hash, load_config_with_preset, CrawlConfig, LanguagePreset};
use section_harvest::crawler::run_crawl;
use section_harvest::output::{load_statistics, print_statistics};
use section_harvest::storage::{read_visited, reset_state, seed_frontier, FrontierStore};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Section-Harvest: a polite single-domain corpus crawler
///
/// Section-Harvest walks one section of a website breadth-first, respecting
/// robots.txt and a request rate, and appends the extracted text of every page
/// to a JSONL corpus. Interrupted crawls resume from their last checkpoint.
#[derive(Parser, Debug)]
#[command(name = "section-harvest")]
#[command(version)]
#[command(about = "A polite single-domain corpus crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Language preset filling seeds and allow-paths left empty (fr or en)
    #[arg(long, value_name = "LANG")]
    lang: Option<LanguagePreset>,

    /// Forget the visited log and frontier checkpoint before crawling
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show corpus statistics and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config_with_preset(&cli.config, cli.lang)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;
    let hash = compute_config_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("section_harvest=info,warn"),
            1 => EnvFilter::new("section_harvest=debug,info"),
            2 => EnvFilter::new("section_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &CrawlConfig) -> anyhow::Result<()> {
    println!("=== Section-Harvest Dry Run ===\n");

    println!("Scope:");
    println!("  Target domain: {}", config.crawl.target_domain);
    println!("  Allowed paths: {}", config.crawl.allow_paths.join(", "));
    println!("  Section label: {}", config.crawl.section);
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Checkpoint every: {} pages", config.crawl.checkpoint_interval);
    println!("  Max content size: {} bytes", config.crawl.max_content_bytes);

    println!("\nPoliteness:");
    println!("  User agent: {}", config.politeness.user_agent);
    println!("  Rate: {} req/s (jitter {}s)", config.politeness.rate, config.politeness.jitter);
    println!("  Timeout: {}s", config.politeness.timeout);
    println!(
        "  Retries: {} (backoff base {}s)",
        config.politeness.max_retries, config.politeness.backoff_base
    );
    println!("  Obey robots.txt: {}", config.politeness.obey_robots);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path.display());
    match &config.output.mirror_dir {
        Some(dir) => println!("  Mirror: {}", dir.display()),
        None => println!("  Mirror: disabled"),
    }
    println!("  State: {}", config.output.state_dir.display());

    let visited = read_visited(&config.output.visited_file())?;
    let checkpoint = FrontierStore::new(&config.output.frontier_file());
    let pending = seed_frontier(&checkpoint, &visited, &config.crawl.seeds)?;

    println!("\nFrontier ({} pending, {} visited):", pending.len(), visited.len());
    for url in pending.iter().take(20) {
        println!("  - {}", url);
    }
    if pending.len() > 20 {
        println!("  ... and {} more", pending.len() - 20);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the corpus and state files
fn handle_stats(config: &CrawlConfig) -> anyhow::Result<()> {
    println!("Records: {}", config.output.records_path.display());
    println!("State: {}\n", config.output.state_dir.display());

    let stats = load_statistics(config)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
        reset_state(&config.output.visited_file(), &config.output.frontier_file())
            .context("failed to reset crawl state")?;
    } else {
        tracing::info!("Starting crawl (will resume from checkpoint if present)");
    }

    tracing::info!(
        "Seeds: {}, allowed paths: {}",
        config.crawl.seeds.len(),
        config.crawl.allow_paths.join(", ")
    );

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current page");
            signal.cancel();
        }
    });

    match run_crawl(config, cancel).await {
        Ok(stats) => {
            tracing::info!(
                "Crawl finished: {} records written, {} URLs skipped",
                stats.processed,
                stats.skipped()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
