use crate::error::CliError;
use clap::{Args, Subcommand};
use connectors::gdata::{FeedEndpoint, video_id_from_url};
use model::{core::identifiers::Locator, pagination::QueryParams};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the number of results in a feed
    Count {
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Print the entry at a 0-based position
    Get {
        #[command(flatten)]
        feed: FeedArgs,

        #[arg(allow_negative_numbers = true)]
        index: isize,
    },
    /// Print the entries in [START, STOP)
    Slice {
        #[command(flatten)]
        feed: FeedArgs,

        #[arg(allow_negative_numbers = true)]
        start: isize,

        #[arg(allow_negative_numbers = true)]
        stop: isize,
    },
    /// Walk the feed from the start
    List {
        #[command(flatten)]
        feed: FeedArgs,

        #[arg(long, help = "Stop after this many entries")]
        limit: Option<usize>,
    },
    /// Print feed metadata and paging state
    Info {
        #[command(flatten)]
        feed: FeedArgs,
    },
}

/// Which feed to open. Exactly one must be given.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct FeedSelector {
    #[arg(long, help = "Feed URL")]
    pub url: Option<String>,

    #[arg(long, help = "Search videos matching these terms")]
    pub search: Option<String>,

    #[arg(long, value_name = "USER", help = "Videos uploaded by a user")]
    pub uploads: Option<String>,

    #[arg(long, value_name = "VIDEO", help = "Comments on a video (id or watch URL)")]
    pub comments: Option<String>,

    #[arg(long, value_name = "VIDEO", help = "Videos related to a video (id or watch URL)")]
    pub related: Option<String>,

    #[arg(long, value_name = "USER", help = "Subscriptions of a user")]
    pub subscriptions: Option<String>,
}

impl FeedSelector {
    pub fn endpoint(&self) -> Result<FeedEndpoint, CliError> {
        if let Some(url) = &self.url {
            return Ok(FeedEndpoint::Custom(Locator::from(url.as_str())));
        }
        if let Some(term) = &self.search {
            return Ok(FeedEndpoint::Search { term: term.clone() });
        }
        if let Some(user) = &self.uploads {
            return Ok(FeedEndpoint::Uploads { user: user.clone() });
        }
        if let Some(video) = &self.comments {
            return Ok(FeedEndpoint::Comments {
                video_id: video_id(video)?,
            });
        }
        if let Some(video) = &self.related {
            return Ok(FeedEndpoint::Related {
                video_id: video_id(video)?,
            });
        }
        if let Some(user) = &self.subscriptions {
            return Ok(FeedEndpoint::Subscriptions { user: user.clone() });
        }
        Err(CliError::InvalidFeed("no feed selected".into()))
    }
}

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    #[command(flatten)]
    pub selector: FeedSelector,

    #[arg(
        long = "query",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        help = "Extra query parameter, repeatable"
    )]
    pub query: Vec<(String, String)>,

    #[arg(long, value_name = "SECS", help = "Per-request timeout")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print JSON instead of a summary")]
    pub json: bool,
}

impl FeedArgs {
    /// Endpoint parameters overlaid with the `--query` pairs.
    pub fn query_params(&self, endpoint: &FeedEndpoint) -> QueryParams {
        let extra: QueryParams = self.query.iter().cloned().collect();
        endpoint.query().merged(&extra)
    }
}

fn video_id(value: &str) -> Result<String, CliError> {
    if value.contains("://") {
        Ok(video_id_from_url(value)?)
    } else {
        Ok(value.to_string())
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidQuery(raw.to_string())),
    }
}
