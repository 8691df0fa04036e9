// src/notify/mod.rs
pub mod fcm;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::settings::NotifySettings;
use crate::error::DispatchError;

/// Topic-addressed push message. Clients subscribed to `topic` render
/// `{ title, body }` as they see fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub title: String,
    pub body: String,
    pub topic: String,
}

impl NotificationTemplate {
    pub const COUNT_PLACEHOLDER: &'static str = "{count}";

    pub fn render(&self, count: usize) -> PushMessage {
        PushMessage {
            title: self.title.clone(),
            body: self
                .body
                .replace(Self::COUNT_PLACEHOLDER, &count.to_string()),
            topic: self.topic.clone(),
        }
    }
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        NotifySettings::default().into()
    }
}

impl From<NotifySettings> for NotificationTemplate {
    fn from(s: NotifySettings) -> Self {
        Self {
            title: s.title,
            body: s.body,
            topic: s.topic,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, msg: &PushMessage) -> Result<(), DispatchError>;
    fn name(&self) -> &'static str;
}

/// Used when no push project is configured: the alert only reaches the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, msg: &PushMessage) -> Result<(), DispatchError> {
        tracing::info!(
            topic = %msg.topic,
            title = %msg.title,
            body = %msg.body,
            "push disabled; alert logged only"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// FCM when a project id is known, otherwise [`LogNotifier`].
pub fn notifier_from_settings(settings: &NotifySettings) -> Result<Box<dyn Notifier>> {
    match settings.fcm_project_id.as_deref() {
        Some(project) => {
            let timeout = Duration::from_secs(settings.timeout_secs);
            let fcm = fcm::FcmNotifier::from_env(project, timeout)?;
            tracing::info!(project, "FCM notifier enabled");
            Ok(Box::new(fcm))
        }
        None => {
            tracing::warn!("FCM_PROJECT_ID not set; notifications go to the log only");
            Ok(Box::new(LogNotifier))
        }
    }
}
