use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use link_harvester::harvest::MatchPolicy;
use link_harvester::{GitHubClient, HarvestPipeline, HarvesterConfig, ProfileKind};

#[derive(Parser, Debug)]
#[command(author, version, about = "Harvest streaming links from GitHub code search", long_about = None)]
struct Args {
    /// Which harvester to run: manifest (.mpd links) or playlist (.m3u files)
    #[arg(short, long)]
    profile: Option<ProfileKind>,

    /// Result file (defaults to the profile's file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lookback in days when the result file is missing or empty
    #[arg(long)]
    cold_start_days: Option<u32>,

    /// Maximum search pages per query
    #[arg(long)]
    max_pages: Option<u32>,

    /// Line matching policy: strict or loose
    #[arg(long)]
    policy: Option<MatchPolicy>,

    /// Configuration file (default: ./harvester.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the run report as JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config =
        HarvesterConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(profile) = args.profile {
        config.profile = profile;
    }
    if let Some(output) = args.output {
        config.store_path = Some(output);
    }
    if let Some(days) = args.cold_start_days {
        config.cold_start_days = days;
    }
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(policy) = args.policy {
        config.match_policy = Some(policy);
    }

    // Checked before any client is built or the store is touched.
    let token = config.token()?;

    let client = GitHubClient::new(&token)
        .context("building HTTP client")?
        .with_search_url(config.search_url.clone())
        .with_content_timeout(config.content_timeout());

    let store_path = config.resolved_store_path();
    info!(
        profile = ?config.profile,
        store = %store_path.display(),
        "Starting harvest"
    );

    let pipeline = HarvestPipeline::new(client.clone(), client, config.harvest_profile())
        .with_pacing(config.pacing())
        .with_retry(config.retry_policy())
        .with_max_pages(config.max_pages)
        .with_cold_start_days(config.cold_start_days);

    let report = pipeline
        .execute(&store_path)
        .await
        .with_context(|| format!("harvesting into {}", store_path.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        println!(
            "Added {} new links to {}",
            report.stats.new_records,
            store_path.display()
        );
    }
    Ok(())
}
