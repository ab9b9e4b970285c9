//! The resilient fetcher: bounded retries with a fixed backoff delay.
//!
//! Every network access in the pipeline goes through [`Fetcher::fetch`] —
//! the debris page, the one map page, and the many fleet pages alike.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use debrisscan_shared::{CrawlConfig, DebrisError, FetchError, Result};

/// User-Agent string for all requests.
const USER_AGENT: &str = concat!("debrisscan/", env!("CARGO_PKG_VERSION"));

/// Retry and timeout knobs for one fetcher instance.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total attempt budget per URL, including the first try.
    pub max_attempts: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Fixed delay between consecutive attempts (not exponential).
    pub backoff: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(15),
            backoff: Duration::from_secs(2),
        }
    }
}

impl From<&CrawlConfig> for FetchOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            timeout: Duration::from_secs(config.timeout_secs),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// HTTP fetcher with bounded retries. No caching, no state beyond the
/// underlying connection pool.
pub struct Fetcher {
    client: Client,
    options: FetchOptions,
}

impl Fetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(options.timeout)
            .build()
            .map_err(|e| DebrisError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, options })
    }

    /// Fetch `url` as text, retrying up to the attempt budget with a fixed
    /// delay between attempts. Any failed attempt — transport error, HTTP
    /// error status, or timeout — is retried the same way; the last failure
    /// is returned once the budget is exhausted.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let mut remaining = self.options.max_attempts.max(1);

        loop {
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    remaining -= 1;
                    if remaining == 0 {
                        return Err(DebrisError::network(url.as_str(), err));
                    }
                    warn!(%url, error = %err, remaining, "fetch attempt failed, retrying");
                    tokio::time::sleep(self.options.backoff).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url) -> std::result::Result<String, FetchError> {
        debug!(%url, "fetching");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                seconds: self.options.timeout.as_secs(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
