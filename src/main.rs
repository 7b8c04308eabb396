//! Page-Mirror main entry point
//!
//! This is the command-line interface for the Page-Mirror offline web page
//! mirror.

use anyhow::Context;
use clap::Parser;
use page_mirror::config::{build_config, load_config_with_hash, MirrorSection};
use page_mirror::crawler::Crawler;
use page_mirror::output::print_report;
use page_mirror::{ConfigError, CrawlConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Page-Mirror: save a web page for offline viewing
///
/// Page-Mirror downloads a page together with its images, stylesheets and
/// scripts, and rewrites the markup so the copy renders from local disk.
/// With --recursive it also mirrors the same-site pages the page links to.
#[derive(Parser, Debug)]
#[command(name = "page-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror a web page and its assets to local disk", long_about = None)]
struct Cli {
    /// URL of the page to mirror
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Existing directory the mirror is written into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Follow same-site links and mirror the linked pages too
    #[arg(short, long)]
    recursive: bool,

    /// Maximum number of link hops followed from the root page
    #[arg(short = 'l', long = "depth", value_name = "N")]
    depth: Option<u32>,

    /// Download and follow references to other domains
    #[arg(short = 'd', long, visible_alias = "domain")]
    allow_cross_domain: bool,

    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Values given on the command line; unset flags leave file values alone
    fn overrides(&self) -> MirrorSection {
        MirrorSection {
            url: self.url.clone(),
            output: self.output.clone(),
            recursive: self.recursive.then_some(true),
            max_depth: self.depth,
            verbose: (self.verbose > 0).then_some(true),
            allow_cross_domain: self.allow_cross_domain.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (config, config_hash) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("error: {}", e);
            if let ConfigError::MissingOutputDir(_) = e {
                eprintln!("Create the output directory first, then run again.");
            }
            return Ok(ExitCode::from(1));
        }
    };

    // The config file may enable verbose output on its own
    let verbosity = if config.verbose { cli.verbose.max(1) } else { cli.verbose };
    setup_logging(verbosity, cli.quiet);

    if let (Some(path), Some(hash)) = (&cli.config, &config_hash) {
        tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
    }

    handle_mirror(config).await?;

    Ok(ExitCode::SUCCESS)
}

/// Layers the command line over the optional config file and validates
/// the result
fn resolve_config(cli: &Cli) -> Result<(CrawlConfig, Option<String>), ConfigError> {
    let (file_section, hash) = match &cli.config {
        Some(path) => {
            let (section, hash) = load_config_with_hash(path)?;
            (section, Some(hash))
        }
        None => (MirrorSection::default(), None),
    };

    let config = build_config(file_section.merge(cli.overrides()))?;
    Ok((config, hash))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_mirror=info,warn"),
            1 => EnvFilter::new("page_mirror=debug,info"),
            _ => EnvFilter::new("page_mirror=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the main mirror operation
async fn handle_mirror(config: CrawlConfig) -> anyhow::Result<()> {
    let crawler = Crawler::new(config).context("failed to create HTTP client")?;

    // Ctrl-C stops the run; pages still in progress are not written
    let cancel = crawler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            cancel.cancel();
        }
    });

    let report = crawler.run().await;
    print_report(&report);

    Ok(())
}
