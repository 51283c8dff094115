use crate::{
    decoder::PageDecoder,
    error::{DecodeError, FetchError},
    http::config::HttpConfig,
    source::FeedSource,
};
use async_trait::async_trait;
use model::pagination::{PageRequest, PageResponse};
use reqwest::{Client, StatusCode, Url, header::RETRY_AFTER};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header carrying the developer key.
pub const DEV_KEY_HEADER: &str = "X-GData-Key";

/// Feed source that fetches pages over HTTP and decodes them with `D`.
pub struct HttpFeedSource<D> {
    client: Client,
    config: HttpConfig,
    decoder: D,
}

impl<D: PageDecoder> HttpFeedSource<D> {
    /// Creates a source with default configuration.
    pub fn new(decoder: D) -> Result<Self, FetchError> {
        Self::with_config(decoder, HttpConfig::default())
    }

    pub fn with_config(decoder: D, config: HttpConfig) -> Result<Self, FetchError> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("tubefeed/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            decoder,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Renders the URL for a page request.
    ///
    /// Parameters already present on the locator are kept unless the request
    /// sets them too, in which case the request wins.
    pub fn request_url(&self, request: &PageRequest) -> Result<Url, FetchError> {
        let mut url = Url::parse(request.locator.as_str())
            .map_err(|e| FetchError::InvalidLocator(format!("{}: {e}", request.locator)))?;

        let params = request
            .query_pairs()
            .with("alt", "json")
            .with("v", &self.config.api_version);

        let existing: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !params.contains(k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(existing);
            for (k, v) in params.iter() {
                pairs.append_pair(k, v);
            }
        }

        Ok(url)
    }

    async fn fetch_once(
        &self,
        url: &Url,
        request: &PageRequest,
    ) -> Result<PageResponse<D::Record>, FetchError> {
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let mut builder = self.client.get(url.clone()).timeout(timeout);
        if let Some(key) = &self.config.dev_key {
            builder = builder.header(DEV_KEY_HEADER, format!("key={key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::Forbidden {
                url: url.to_string(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|secs| secs.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(FetchError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown error").into(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let body: Value = serde_json::from_slice(&bytes).map_err(DecodeError::from)?;
        let page = self.decoder.decode(body)?;

        debug!(
            "Fetched {} records from {} (start-index={}, total={:?})",
            page.len(),
            request.locator,
            request.start_index,
            page.total_count
        );
        Ok(page)
    }
}

#[async_trait]
impl<D: PageDecoder> FeedSource for HttpFeedSource<D> {
    type Record = D::Record;

    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse<Self::Record>, FetchError> {
        let url = self.request_url(request)?;
        debug!("GET {}", url);

        self.config
            .retry
            .run(|| self.fetch_once(&url, request))
            .await
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            timeout: Some(timeout),
        }
    } else {
        FetchError::Network(err)
    }
}
