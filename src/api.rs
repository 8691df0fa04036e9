// src/api.rs
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::detector::ObservedCount;
use crate::tick::{LastTick, Poller, TickReport};

#[derive(Clone)]
pub struct AppState {
    pub observed: ObservedCount,
    pub last: LastTick,
}

impl AppState {
    pub fn from_poller(p: &Poller) -> Self {
        Self {
            observed: p.observed(),
            last: p.last_tick(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusResp {
    observed_count: usize,
    last_tick: Option<TickReport>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/status", get(status))
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusResp> {
    let last_tick = state.last.read().ok().and_then(|g| g.clone());
    Json(StatusResp {
        observed_count: state.observed.get(),
        last_tick,
    })
}
