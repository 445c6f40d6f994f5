//! Podcast discovery CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use podcast_discovery::{
    config::RegistryConfig,
    toplist::{ItunesTopListLoader, SubscribedFeed, COUNTRY_CODE_UNSET},
    PodcastSearchResult, ProviderRegistry,
};

/// Podcast discovery - search podcasts across providers
#[derive(Parser)]
#[command(name = "podcast-discovery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all active providers
    Search(SearchArgs),

    /// Resolve a result URL into a feed URL
    Lookup {
        /// URL from a search result
        url: String,
    },

    /// Show the iTunes top podcasts
    Toplist(ToplistArgs),

    /// List registered providers
    Providers,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results to display
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct ToplistArgs {
    /// Two-letter country code (99 = system locale)
    #[arg(long, default_value = COUNTRY_CODE_UNSET)]
    country: String,

    /// Maximum number of podcasts to display (0 = whole chart)
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// JSON file with subscribed feeds ([{"title": ..., "author": ...}])
    #[arg(short, long)]
    subscribed: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => RegistryConfig::from_file(path)?,
        None => RegistryConfig::default(),
    };
    let registry = ProviderRegistry::from_config(&config);

    match cli.command {
        Commands::Search(args) => run_search(&registry, args).await,
        Commands::Lookup { url } => run_lookup(&registry, &url).await,
        Commands::Toplist(args) => run_toplist(&config, args).await,
        Commands::Providers => list_providers(&registry),
    }
}

fn list_providers(registry: &ProviderRegistry) -> Result<()> {
    println!("Registered providers:\n");
    for entry in registry.providers() {
        let searcher = entry.searcher();
        let label = if searcher.is_aggregate() {
            "combined".to_string()
        } else {
            searcher.name()
        };
        let state = if searcher.is_aggregate() {
            "aggregate"
        } else if entry.is_active() {
            "active"
        } else {
            "disabled"
        };
        println!("  {:<10} weight {:.2}  ({})", label, entry.weight(), state);
    }
    Ok(())
}

async fn run_search(registry: &ProviderRegistry, args: SearchArgs) -> Result<()> {
    let combined = registry.combined();
    if matches!(args.format, OutputFormat::Text) {
        eprintln!("Searching {}", combined.name());
    }

    let results = combined.search(&args.query).await?;
    print_results(&results, args.limit, args.format, &format!("\"{}\"", args.query))
}

async fn run_lookup(registry: &ProviderRegistry, url: &str) -> Result<()> {
    let feed_url = registry.lookup_url(url).await?;
    println!("{}", feed_url);
    Ok(())
}

async fn run_toplist(config: &RegistryConfig, args: ToplistArgs) -> Result<()> {
    let subscribed: Vec<SubscribedFeed> = match &args.subscribed {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };

    let loader = ItunesTopListLoader::from_config(config);
    let results = loader
        .load_toplist(&args.country, args.limit, &subscribed)
        .await?;
    print_results(&results, results.len(), args.format, "top list")
}

fn print_results(
    results: &[PodcastSearchResult],
    limit: usize,
    format: OutputFormat,
    heading: &str,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("\nPodcasts for {} ({} results):\n", heading, results.len());

            for (i, result) in results.iter().take(limit).enumerate() {
                println!("{}. {}", i + 1, result.title);
                if let Some(author) = &result.author {
                    println!("   By: {}", author);
                }
                if let Some(feed_url) = &result.feed_url {
                    println!("   Feed: {}", feed_url);
                }
                if let Some(count) = result.episode_count {
                    println!("   Episodes: {}", count);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = results.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for result in results.iter().take(limit) {
                println!(
                    "{}\t{}",
                    result.title,
                    result.feed_url.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
