// src/scheduler.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::tick::Poller;

/// Parse a 5-field cron expression. The `cron` crate wants a seconds field,
/// so one is prepended.
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    let full = format!("0 {}", expr.trim());
    full.parse::<Schedule>()
        .map_err(|e| anyhow!("invalid cron expression '{expr}': {e}"))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("invalid timezone '{name}': {e}"))
}

/// Next fire time strictly after `now`, evaluated in `tz`.
pub fn next_run_after(schedule: &Schedule, tz: Tz, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule
        .after(&now.with_timezone(&tz))
        .next()
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone)]
pub struct PollSchedule {
    pub schedule: Schedule,
    pub tz: Tz,
}

impl PollSchedule {
    pub fn new(cron_expr: &str, timezone: &str) -> Result<Self> {
        Ok(Self {
            schedule: parse_schedule(cron_expr).context("schedule.cron")?,
            tz: parse_timezone(timezone).context("schedule.timezone")?,
        })
    }
}

/// Run ticks forever on `sched`. Each tick is awaited before the next fire
/// time is computed, so ticks never overlap; a tick that overruns its slot
/// just pushes the next one out.
pub async fn run_poller(poller: Arc<Poller>, sched: PollSchedule) {
    loop {
        let now = Utc::now();
        let Some(next) = next_run_after(&sched.schedule, sched.tz, now) else {
            tracing::error!("schedule has no upcoming fire time; poller stopping");
            return;
        };

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::debug!(
            next = %next.with_timezone(&sched.tz).format("%Y-%m-%d %H:%M:%S %Z"),
            wait_secs = wait.as_secs(),
            "waiting for next tick"
        );
        tokio::time::sleep(wait).await;

        let report = poller.tick_from_env().await;
        tracing::debug!(?report.outcome, ?report.notification, "tick finished");
    }
}

pub fn spawn_poller(poller: Arc<Poller>, sched: PollSchedule) -> JoinHandle<()> {
    tokio::spawn(run_poller(poller, sched))
}
