//! Press-Trawl main entry point
//!
//! This is the command-line interface for the Press-Trawl news harvester.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use press_trawl::config::{load_config_with_hash, Config};
use press_trawl::crawler::Coordinator;
use press_trawl::output::{print_batch_report, print_session_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Press-Trawl: keyword-driven news harvesting
///
/// Press-Trawl searches publisher sites for a keyword, pages through the
/// results, downloads every article found and appends one CSV row per
/// article to `<root>/<site>/<site>_<keyword>.csv`.
#[derive(Parser, Debug)]
#[command(name = "press-trawl")]
#[command(version = "1.0.0")]
#[command(about = "Keyword-driven news harvesting", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Settings applied on top of the configuration file
#[derive(Args, Debug, Default)]
struct Overrides {
    /// First search page to request
    #[arg(long, global = true)]
    start_page: Option<u32>,

    /// Last search page to request (inclusive)
    #[arg(long, global = true)]
    end_page: Option<u32>,

    /// Earliest publication date (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, global = true)]
    begin: Option<String>,

    /// Latest publication date (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, global = true)]
    end: Option<String>,

    /// Output root directory
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(page) = self.start_page {
            config.crawler.start_page = page;
        }
        if let Some(page) = self.end_page {
            config.crawler.end_page = page;
        }
        if self.begin.is_some() {
            config.time_filter.begin = self.begin;
        }
        if self.end.is_some() {
            config.time_filter.end = self.end;
        }
        if let Some(root) = self.output {
            config.output.root = root.display().to_string();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one site for one keyword
    Crawl {
        /// Site id, as listed by `sites` (case-sensitive)
        #[arg(short, long)]
        site: String,

        /// Search phrase
        #[arg(short, long)]
        keyword: String,
    },

    /// Crawl every site × keyword pair
    Auto {
        /// Sites to crawl (defaults to `[batch] sites`)
        #[arg(short, long, value_delimiter = ',')]
        sites: Vec<String>,

        /// Keywords to search (defaults to `[batch] keywords`)
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Deduplicate an output file
    Compact {
        /// CSV file to compact
        #[arg(value_name = "FILE", required_unless_present_all = ["site", "keyword"])]
        path: Option<PathBuf>,

        /// Locate the file by site instead of by path
        #[arg(long, requires = "keyword", conflicts_with = "path")]
        site: Option<String>,

        #[arg(long, requires = "site")]
        keyword: Option<String>,
    },

    /// List registered site profiles
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_ref())?;
    cli.overrides.apply(&mut config);
    press_trawl::config::validate(&config).context("invalid settings")?;

    match cli.command {
        Command::Crawl { site, keyword } => handle_crawl(config, &site, &keyword).await,
        Command::Auto { sites, keywords } => handle_auto(config, sites, keywords).await,
        Command::Compact {
            path,
            site,
            keyword,
        } => handle_compact(config, path, site, keyword),
        Command::Sites => handle_sites(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("press_trawl=info,warn"),
            1 => EnvFilter::new("press_trawl=debug,info"),
            2 => EnvFilter::new("press_trawl=trace,debug"),
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

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Handles `crawl`: one site, one keyword
async fn handle_crawl(config: Config, site: &str, keyword: &str) -> Result<()> {
    let coordinator = Coordinator::new(config)?;
    let report = coordinator.crawl(site, keyword).await?;
    print_session_report(&report);
    Ok(())
}

/// Handles `auto`: the full site × keyword batch
async fn handle_auto(config: Config, sites: Vec<String>, keywords: Vec<String>) -> Result<()> {
    let sites = if sites.is_empty() {
        config.batch.sites.clone()
    } else {
        sites
    };
    let keywords = if keywords.is_empty() {
        config.batch.keywords.clone()
    } else {
        keywords
    };

    if sites.is_empty() || keywords.is_empty() {
        bail!("auto needs at least one site and one keyword (flags or [batch] table)");
    }

    let coordinator = Coordinator::new(config)?;
    let report = coordinator.auto(&sites, &keywords).await?;
    print_batch_report(&report);
    if report.has_failures() {
        tracing::warn!("{} of {} runs failed", report.failed.len(), report.total_pairs());
    }
    Ok(())
}

/// Handles `compact`: deduplicate one output file
fn handle_compact(
    config: Config,
    path: Option<PathBuf>,
    site: Option<String>,
    keyword: Option<String>,
) -> Result<()> {
    let coordinator = Coordinator::new(config)?;
    let path = match (path, site, keyword) {
        (Some(path), _, _) => path,
        (None, Some(site), Some(keyword)) => coordinator.record_path(&site, &keyword)?,
        _ => bail!("compact needs a FILE or both --site and --keyword"),
    };

    let stats = coordinator.compact(&path)?;
    println!(
        "✓ {}: {} -> {} rows ({} duplicates, {} incomplete removed)",
        path.display(),
        stats.rows_before,
        stats.rows_after,
        stats.duplicates_removed,
        stats.incomplete_removed
    );
    Ok(())
}

/// Handles `sites`: list the registry
fn handle_sites(config: &Config) -> Result<()> {
    let registry = config.site_registry()?;

    println!("=== Registered Sites ({}) ===\n", registry.len());
    for profile in registry.profiles() {
        println!(
            "  {:<12} {:<9} joiner {:<6} {}",
            profile.id,
            profile.strategy,
            profile.keyword_joiner,
            profile.url_template.as_str()
        );
    }
    Ok(())
}
