use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;

use crate::{FetchError, FetchFailure};

/// Browser-like user agent; the stats site rejects obvious non-browser
/// clients.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub accept_language: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Issues a single bounded GET and classifies the outcome.
///
/// Never retries; retry policy belongs to the caller, and the crawl
/// orchestrator deliberately performs none.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body on HTTP 200.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Builds the client once with the fixed header set; it is reused for
    /// the whole run.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&settings.user_agent)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&settings.accept_language)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FetchFailure::Transport, err.to_string()))?;

        Ok(Self { client })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value)
        .map_err(|err| FetchError::new(FetchFailure::Transport, err.to_string()))
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FetchFailure::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::new(
                FetchFailure::Status(status.as_u16()),
                status.to_string(),
            ));
        }

        response.text().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FetchFailure::Timeout, err.to_string());
    }
    FetchError::new(FetchFailure::Transport, err.to_string())
}
