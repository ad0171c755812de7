//! Campus-Crawler main entry point
//!
//! This is the command-line interface for the Campus-Crawler site mapper.

use anyhow::Context;
use campus_crawler::config::{load_config_with_hash, Config};
use campus_crawler::crawler::Coordinator;
use campus_crawler::output::Reporter;
use campus_crawler::StopReason;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit status used when the run is stopped with Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

/// Campus-Crawler: a polite single-domain site mapper
///
/// Campus-Crawler walks every reachable HTML page under one domain suffix,
/// breadth-first from the configured seeds, while respecting robots.txt and a
/// fixed request pace. It writes the visited URLs to a link list and every
/// fetch failure to an error log.
#[derive(Parser, Debug)]
#[command(name = "campus-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-domain site mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress lines and non-error logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured page cap
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    max_pages: Option<u64>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages as usize;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let reason = handle_crawl(config, config_hash, cli.quiet).await?;
    if !reason.is_complete() {
        std::process::exit(EXIT_INTERRUPTED);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("campus_crawler=info,warn"),
            1 => EnvFilter::new("campus_crawler=debug,info"),
            2 => EnvFilter::new("campus_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Campus-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Flush every: {} pages", config.crawler.flush_every);

    println!("\nScope:");
    println!(
        "  Allowed domain suffix: {}",
        config.scope.allowed_domain_suffix
    );
    println!(
        "  Skip URL patterns: {}",
        config.scope.skip_url_patterns.join(", ")
    );
    println!(
        "  Skip extensions: {}",
        config.scope.skip_extensions.join(" ")
    );

    println!("\nRobots:");
    println!("  On fetch failure: {:?}", config.robots.on_fetch_failure);
    for prefix in &config.robots.extra_disallowed_prefixes {
        println!("  Always disallowed: {}", prefix);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Link list: {}", config.output.links_path);
    println!("  Error log: {}", config.output.error_log_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: String,
    quiet: bool,
) -> anyhow::Result<StopReason> {
    tracing::info!(
        "Crawling {} from {} seed(s)",
        config.scope.allowed_domain_suffix,
        config.seeds.len()
    );

    let coordinator = Coordinator::new(config, Some(config_hash))
        .context("Failed to initialize crawler")?
        .with_reporter(Reporter::new(quiet));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = coordinator
        .run_until(shutdown)
        .await
        .context("Crawl failed")?;

    Ok(summary.stop_reason)
}
