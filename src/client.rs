//! HTTP transport for the flag-management service.
//!
//! `FlagsClient` owns the authenticated `reqwest` client and knows how to
//! open exactly one subscription attempt; the reconnect loop that drives it
//! lives in [`crate::watch`].

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::backoff::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_RESUME_DELAY};
use crate::error::WatchError;
use crate::request::WatchRequest;

/// Subscription endpoint, relative to the configured base URL.
const EVENTS_PATH: &str = "/api/v1/events";

/// Header carrying the resumption token on reconnect.
const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

/// Client configuration, injected at construction.
///
/// There is no global mutable client state; two clients with different
/// configs are fully independent.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the flag-management service.
    pub base_url: String,
    /// Bearer token; omitted from requests when `None`.
    pub api_token: Option<String>,
    /// First retry delay after a transport error.
    pub initial_backoff: Duration,
    /// Ceiling for the exponential retry sequence.
    pub max_backoff: Duration,
    /// Reconnect delay after a clean end-of-stream.
    pub resume_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_token: None,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            resume_delay: DEFAULT_RESUME_DELAY,
        }
    }
}

/// Client for the flag-management service event feed.
pub struct FlagsClient {
    pub(crate) config: ClientConfig,
    http: Client,
}

impl FlagsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Convenience constructor for an unauthenticated client.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open one subscription attempt and return the live response body.
    ///
    /// GET, or POST with a JSON body when the request carries a payload.
    /// Sends `Last-Event-ID` when resuming. A non-2xx status is returned as
    /// a retryable error without reading the body; the response itself is
    /// never consumed here, that is the parser's job.
    pub async fn open_stream(
        &self,
        request: &WatchRequest,
        last_event_id: &str,
    ) -> Result<reqwest::Response, WatchError> {
        let url = format!("{}{}", self.config.base_url, EVENTS_PATH);

        let mut builder = if request.has_payload() {
            self.http.post(&url).json(&request.payload)
        } else {
            self.http.get(&url)
        };

        builder = builder
            .header("Accept", "text/event-stream")
            .query(&request.query_params());

        if !last_event_id.is_empty() {
            builder = builder.header(LAST_EVENT_ID_HEADER, last_event_id);
        }
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("subscription attempt rejected with status {}", status);
            return Err(WatchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.api_token.is_none());
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
        assert_eq!(config.max_backoff, Duration::from_secs(60));
        assert_eq!(config.resume_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_with_base_url() {
        let client = FlagsClient::with_base_url("https://flags.example.com");
        assert_eq!(client.config().base_url, "https://flags.example.com");
    }
}
