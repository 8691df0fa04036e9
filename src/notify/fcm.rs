// src/notify/fcm.rs
//! Firebase Cloud Messaging, HTTP v1 API, topic delivery.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{Notifier, PushMessage};
use crate::error::{snippet, DispatchError};

pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
pub const ENV_ACCESS_TOKEN: &str = "FCM_ACCESS_TOKEN";
pub const ENV_ENDPOINT: &str = "FCM_ENDPOINT";

/// Refresh metadata tokens this long before they expire.
const TOKEN_SKEW: Duration = Duration::from_secs(60);

pub enum TokenSource {
    /// Pre-issued bearer token (e.g. `gcloud auth print-access-token`).
    Static(String),
    /// GCE / Cloud Run metadata server, cached until shortly before expiry.
    Metadata {
        url: String,
        cached: Mutex<Option<(String, Instant)>>,
    },
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

impl TokenSource {
    pub fn metadata(url: impl Into<String>) -> Self {
        TokenSource::Metadata {
            url: url.into(),
            cached: Mutex::new(None),
        }
    }

    async fn token(&self, client: &Client) -> Result<String, DispatchError> {
        match self {
            TokenSource::Static(t) => Ok(t.clone()),
            TokenSource::Metadata { url, cached } => {
                let mut guard = cached.lock().await;
                if let Some((tok, valid_until)) = guard.as_ref() {
                    if Instant::now() < *valid_until {
                        return Ok(tok.clone());
                    }
                }

                let rsp = client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| DispatchError::Token(e.to_string()))?
                    .error_for_status()
                    .map_err(|e| DispatchError::Token(e.to_string()))?;
                let tok: MetadataToken = rsp
                    .json()
                    .await
                    .map_err(|e| DispatchError::Token(e.to_string()))?;

                let ttl = Duration::from_secs(tok.expires_in).saturating_sub(TOKEN_SKEW);
                *guard = Some((tok.access_token.clone(), Instant::now() + ttl));
                Ok(tok.access_token)
            }
        }
    }
}

pub struct FcmNotifier {
    client: Client,
    endpoint: String,
    project_id: String,
    token: TokenSource,
}

impl FcmNotifier {
    /// `timeout` bounds each push and token request.
    pub fn new(
        project_id: impl Into<String>,
        token: TokenSource,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building fcm http client")?;
        Ok(Self {
            client,
            endpoint: DEFAULT_FCM_ENDPOINT.to_string(),
            project_id: project_id.into(),
            token,
        })
    }

    /// `FCM_ACCESS_TOKEN` if set, else the metadata server.
    /// `FCM_ENDPOINT` overrides the API host.
    pub fn from_env(project_id: &str, timeout: Duration) -> Result<Self> {
        let token = match std::env::var(ENV_ACCESS_TOKEN) {
            Ok(t) if !t.trim().is_empty() => TokenSource::Static(t.trim().to_string()),
            _ => TokenSource::metadata(DEFAULT_METADATA_TOKEN_URL),
        };
        let mut n = Self::new(project_id, token, timeout)?;
        if let Ok(ep) = std::env::var(ENV_ENDPOINT) {
            if !ep.trim().is_empty() {
                n = n.with_endpoint(ep.trim());
            }
        }
        Ok(n)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        )
    }
}

fn fcm_payload(msg: &PushMessage) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "topic": msg.topic,
            "notification": {
                "title": msg.title,
                "body": msg.body,
            }
        }
    })
}

#[async_trait]
impl Notifier for FcmNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<(), DispatchError> {
        let token = self.token.token(&self.client).await?;

        let rsp = self
            .client
            .post(self.send_url())
            .bearer_auth(token)
            .json(&fcm_payload(msg))
            .send()
            .await?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                snippet: snippet(&body, 500),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fcm"
    }
}
