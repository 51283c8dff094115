use crate::{
    commands::{Commands, FeedArgs},
    env::EnvManager,
    error::CliError,
    output::InfoReport,
};
use clap::Parser;
use connectors::{GDataFeedDecoder, HttpConfig, HttpFeedSource, decoder::RawEntry};
use futures_util::{StreamExt, TryStreamExt};
use std::{path::PathBuf, time::Duration};
use stream_core::FeedStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;

type RawFeed = FeedStream<HttpFeedSource<GDataFeedDecoder<RawEntry>>>;

#[derive(Parser, Debug)]
#[command(name = "tubefeed", version, about = "Browse paginated video feeds")]
struct Cli {
    #[arg(long, global = true, help = "Load TUBEFEED_* settings from a .env file")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let config = env.http_config()?;

    match cli.command {
        Commands::Count { feed } => {
            let mut stream = open_feed(&feed, &config)?;
            let count = stream.count().await?;
            if feed.json {
                output::print_json(&count)?;
            } else {
                println!("{count}");
            }
        }
        Commands::Get { feed, index } => {
            let mut stream = open_feed(&feed, &config)?;
            let entry = stream.get(index).await?;
            let position = usize::try_from(index).unwrap_or_default();
            output::print_entries(position, std::slice::from_ref(&entry), feed.json)?;
        }
        Commands::Slice { feed, start, stop } => {
            let mut stream = open_feed(&feed, &config)?;
            let entries = stream.slice(start, stop).await?;
            let position = usize::try_from(start).unwrap_or_default();
            output::print_entries(position, &entries, feed.json)?;
        }
        Commands::List { feed, limit } => {
            let mut stream = open_feed(&feed, &config)?;
            let entries: Vec<_> = stream
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .try_collect()
                .await?;
            info!("Listed {} entries", entries.len());
            output::print_entries(0, &entries, feed.json)?;
        }
        Commands::Info { feed } => {
            let mut stream = open_feed(&feed, &config)?;
            let count = stream.count().await?;
            let report = InfoReport {
                locator: stream.locator().as_str(),
                count,
                cached: stream.frontier(),
                state: stream.state().to_string(),
                info: stream.info(),
            };
            output::print_info(&report, feed.json)?;
        }
    }

    Ok(())
}

fn open_feed(feed: &FeedArgs, config: &HttpConfig) -> Result<RawFeed, CliError> {
    let endpoint = feed.selector.endpoint()?;
    let query = feed.query_params(&endpoint);
    let source = HttpFeedSource::with_config(GDataFeedDecoder::raw(), config.clone())?;

    let mut stream = FeedStream::new(source, endpoint.locator(), query);
    if let Some(secs) = feed.timeout {
        stream = stream.with_timeout(Duration::from_secs(secs));
    }

    info!("Opened feed {}", stream.locator());
    Ok(stream)
}
