// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod tick;

// ---- Re-exports for stable public API ----
pub use crate::config::{FirmsConfig, Settings};
pub use crate::detector::{evaluate, ObservedCount};
pub use crate::error::{DispatchError, TickError};
pub use crate::notify::{NotificationTemplate, Notifier, PushMessage};
pub use crate::tick::{NotificationStatus, Poller, TickOutcome, TickReport};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter; `LOG_FORMAT=json` switches to JSON lines. A second call (or a
/// runtime that already installed one) is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fire_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };

    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
