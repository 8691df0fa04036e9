//! Fire watch service entrypoint.
//! Boots the poller on its cron schedule and serves health/status/metrics.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;

use fire_watch::api::{self, AppState};
use fire_watch::metrics::Metrics;
use fire_watch::scheduler::{spawn_poller, PollSchedule};
use fire_watch::{Poller, Settings};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    fire_watch::init_tracing();

    let settings = Settings::load_default()?;
    let sched = PollSchedule::new(&settings.schedule.cron, &settings.schedule.timezone)?;
    let poller = Arc::new(Poller::from_settings(&settings)?);

    let mut router = api::router(AppState::from_poller(&poller));
    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    tracing::info!(
        cron = %settings.schedule.cron,
        timezone = %settings.schedule.timezone,
        topic = %settings.notify.topic,
        "fire poller scheduled"
    );
    spawn_poller(poller, sched);

    Ok(router.into())
}
