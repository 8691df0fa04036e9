// src/tick.rs
//! One poll cycle: build URL, fetch, geofilter, compare, notify, remember.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::config::{FirmsConfig, Settings};
use crate::detector::{evaluate, ObservedCount};
use crate::error::TickError;
use crate::feed::parse::{count_in_region, BoundingBox};
use crate::feed::{FeedClient, FeedUrl, HttpFeedClient};
use crate::notify::{notifier_from_settings, NotificationTemplate, Notifier};
use crate::scheduler::parse_timezone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickOutcome {
    Completed,
    Aborted { kind: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum NotificationStatus {
    NotNeeded,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Observed count before the tick.
    pub previous: usize,
    /// In-region count; `None` when the tick aborted before parsing.
    pub current: Option<usize>,
    pub notification: NotificationStatus,
    pub finished_at: DateTime<Utc>,
}

impl TickReport {
    fn aborted(previous: usize, err: &TickError) -> Self {
        Self {
            outcome: TickOutcome::Aborted {
                kind: err.kind().to_string(),
                reason: err.to_string(),
            },
            previous,
            current: None,
            notification: NotificationStatus::NotNeeded,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == TickOutcome::Completed
    }
}

/// Shared slot holding the most recent tick report.
pub type LastTick = Arc<RwLock<Option<TickReport>>>;

pub struct Poller {
    feed: Arc<dyn FeedClient>,
    notifier: Arc<dyn Notifier>,
    feed_base: String,
    template: NotificationTemplate,
    region: BoundingBox,
    tz: Tz,
    observed: ObservedCount,
    last: LastTick,
}

impl Poller {
    pub fn new(
        feed_base: impl Into<String>,
        feed: Arc<dyn FeedClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            feed,
            notifier,
            feed_base: feed_base.into(),
            template: NotificationTemplate::default(),
            region: BoundingBox::TURKEY,
            tz: chrono_tz::Europe::Istanbul,
            observed: ObservedCount::new(),
            last: LastTick::default(),
        }
    }

    /// Wire the HTTP feed client and the configured notifier.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let feed = HttpFeedClient::new(&settings.feed)?;
        let notifier = notifier_from_settings(&settings.notify)?;
        let tz = parse_timezone(&settings.schedule.timezone)?;

        Ok(Self::new(&settings.feed.base_url, Arc::new(feed), Arc::from(notifier))
            .with_template(settings.notify.clone().into())
            .with_timezone(tz))
    }

    pub fn with_template(mut self, template: NotificationTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn observed(&self) -> ObservedCount {
        self.observed.clone()
    }

    pub fn last_tick(&self) -> LastTick {
        self.last.clone()
    }

    /// Tick with configuration read from the environment right now.
    pub async fn tick_from_env(&self) -> TickReport {
        self.run_tick(&FirmsConfig::from_env()).await
    }

    /// Never fails: every error path is logged and reported.
    pub async fn run_tick(&self, cfg: &FirmsConfig) -> TickReport {
        let local = Utc::now().with_timezone(&self.tz);
        tracing::info!(local_time = %local.format("%Y-%m-%d %H:%M:%S %Z"), "fire check started");

        let previous = self.observed.get();
        let report = match self.fetch_count(cfg).await {
            Ok(current) => self.apply(previous, current).await,
            Err(e) => {
                counter!("fire_feed_errors_total", "kind" => e.kind()).increment(1);
                TickReport::aborted(previous, &e)
            }
        };

        let outcome = if report.is_completed() { "completed" } else { "aborted" };
        counter!("fire_ticks_total", "outcome" => outcome).increment(1);
        gauge!("fire_observed_count").set(self.observed.get() as f64);
        gauge!("fire_last_tick_ts").set(report.finished_at.timestamp() as f64);

        if let Ok(mut slot) = self.last.write() {
            *slot = Some(report.clone());
        }
        report
    }

    async fn fetch_count(&self, cfg: &FirmsConfig) -> Result<usize, TickError> {
        let url = FeedUrl::build(&self.feed_base, cfg).inspect_err(|e| {
            tracing::error!(error = %e, "feed url could not be built; tick skipped");
        })?;
        tracing::info!(source = %cfg.source, area = %cfg.area, day_range = %cfg.day_range, "feed url ready");

        let rsp = self.feed.fetch(&url).await.inspect_err(|e| {
            tracing::error!(error = %e, url = %url, "feed request failed");
        })?;

        let body = rsp.into_body().inspect_err(|e| {
            if let TickError::UpstreamStatus { status, snippet } = e {
                tracing::error!(status = *status, body = %snippet, url = %url, "feed http error");
            }
        })?;

        let count = count_in_region(&body, &self.region);
        tracing::info!(count, "in-region fire detections");
        gauge!("fire_detections_in_region").set(count as f64);
        Ok(count)
    }

    async fn apply(&self, previous: usize, current: usize) -> TickReport {
        let (next, msg) = evaluate(previous, current, &self.template);

        let notification = match msg {
            None => {
                tracing::debug!(previous, current, "no increase; nothing to send");
                NotificationStatus::NotNeeded
            }
            Some(msg) => match self.notifier.send(&msg).await {
                Ok(()) => {
                    tracing::info!(previous, current, notifier = self.notifier.name(), topic = %msg.topic, "notification sent");
                    counter!("fire_notifications_total", "result" => "sent").increment(1);
                    NotificationStatus::Sent
                }
                Err(e) => {
                    tracing::error!(error = %e, notifier = self.notifier.name(), "notification dispatch failed");
                    counter!("fire_notifications_total", "result" => "failed").increment(1);
                    NotificationStatus::Failed(e.to_string())
                }
            },
        };

        self.observed.set(next);

        TickReport {
            outcome: TickOutcome::Completed,
            previous,
            current: Some(current),
            notification,
            finished_at: Utc::now(),
        }
    }
}
