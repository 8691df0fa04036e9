// src/feed/mod.rs
pub mod parse;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::fmt;
use std::time::Duration;

use crate::config::settings::FeedSettings;
use crate::config::FirmsConfig;
use crate::error::{snippet, TickError};

const REDACTED: &str = "***";

/// Upper bound on how much of an error body is kept for logs and reports.
pub const BODY_SNIPPET_CHARS: usize = 500;

/// Feed request URL. `Display` renders the redacted form so the map key
/// cannot reach a log line by accident; use [`FeedUrl::as_str`] for the call.
#[derive(Clone, PartialEq, Eq)]
pub struct FeedUrl {
    url: String,
    redacted: String,
}

impl FeedUrl {
    /// `<base>/<key>/<source>/<area>/<day-range>[/<date>]`, key percent-encoded.
    pub fn build(base: &str, cfg: &FirmsConfig) -> Result<Self, TickError> {
        let key = cfg
            .map_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TickError::MissingMapKey)?;

        let base = base.trim_end_matches('/');
        let mut tail = vec![cfg.source.as_str(), cfg.area.as_str(), cfg.day_range.as_str()];
        if let Some(date) = cfg.date.as_deref().filter(|d| !d.is_empty()) {
            tail.push(date);
        }
        let tail = tail.join("/");

        Ok(Self {
            url: format!("{base}/{}/{tail}", urlencoding::encode(key)),
            redacted: format!("{base}/{REDACTED}/{tail}"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted)
    }
}

impl fmt::Debug for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FeedUrl").field(&self.redacted).finish()
    }
}

/// Raw feed response; status interpretation is left to the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response. Any other status becomes
    /// [`TickError::UpstreamStatus`] carrying at most
    /// [`BODY_SNIPPET_CHARS`] of the body.
    pub fn into_body(self) -> Result<String, TickError> {
        if self.is_success() {
            return Ok(self.body);
        }
        Err(TickError::UpstreamStatus {
            status: self.status,
            snippet: snippet(&self.body, BODY_SNIPPET_CHARS),
        })
    }
}

#[async_trait]
pub trait FeedClient: Send + Sync {
    /// One attempt. Transport failures map to [`TickError::Transport`];
    /// any HTTP status, including errors, comes back as `Ok`.
    async fn fetch(&self, url: &FeedUrl) -> Result<FeedResponse, TickError>;
}

pub struct HttpFeedClient {
    client: Client,
    user_agent: String,
}

impl HttpFeedClient {
    pub fn new(settings: &FeedSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            client,
            user_agent: settings.user_agent.clone(),
        })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &FeedUrl) -> Result<FeedResponse, TickError> {
        // `without_url` keeps the key out of the error text.
        let rsp = self
            .client
            .get(url.as_str())
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| TickError::Transport(e.without_url().to_string()))?;

        let status = rsp.status().as_u16();
        let body = rsp
            .text()
            .await
            .map_err(|e| TickError::Transport(e.without_url().to_string()))?;

        Ok(FeedResponse { status, body })
    }
}
