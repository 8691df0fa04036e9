// src/error.rs
use thiserror::Error;

/// Failures that abort a tick. None of these escape `run_tick`; they are
/// logged and folded into the tick report.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("FIRMS_MAP_KEY missing; set it in the environment or .env")]
    MissingMapKey,

    #[error("feed returned HTTP {status}: {snippet}")]
    UpstreamStatus { status: u16, snippet: String },

    #[error("feed request failed: {0}")]
    Transport(String),
}

impl TickError {
    /// Short label for metrics and the status endpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            TickError::MissingMapKey => "config",
            TickError::UpstreamStatus { .. } => "upstream_status",
            TickError::Transport(_) => "transport",
        }
    }
}

/// Push delivery failures. Logged, never abort the count update.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push service returned HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    #[error("could not obtain push access token: {0}")]
    Token(String),
}

/// Cut a response body down for logging, on a char boundary.
pub fn snippet(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
