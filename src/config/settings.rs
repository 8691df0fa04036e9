// src/config/settings.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SETTINGS_PATH: &str = "FIRE_WATCH_SETTINGS_PATH";
pub const DEFAULT_SETTINGS_PATH: &str = "config/fire_watch.toml";
pub const ENV_FCM_PROJECT_ID: &str = "FCM_PROJECT_ID";

pub const DEFAULT_FEED_BASE: &str = "https://firms.modaps.eosdis.nasa.gov/api/area/csv";
pub const DEFAULT_USER_AGENT: &str = "FireSafetyApp-Poller";
pub const DEFAULT_SCHEDULE: &str = "*/10 * * * *";
pub const DEFAULT_TIMEZONE: &str = "Europe/Istanbul";
pub const DEFAULT_TOPIC: &str = "fires";

fn default_feed_base() -> String {
    DEFAULT_FEED_BASE.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_push_timeout_secs() -> u64 {
    10
}
fn default_title() -> String {
    "🔥 Yeni Yangın Tespit Edildi!".to_string()
}
fn default_body() -> String {
    "Türkiye'de {count} aktif yangın var.".to_string()
}
fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedSettings {
    #[serde(default = "default_feed_base")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout for the feed call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: default_feed_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSettings {
    /// 5-field cron expression.
    #[serde(default = "default_schedule")]
    pub cron: String,
    /// IANA zone used for schedule alignment and log timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            cron: default_schedule(),
            timezone: default_timezone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotifySettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// `{count}` is replaced with the current in-region count.
    #[serde(default = "default_body")]
    pub body: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub fcm_project_id: Option<String>,
    /// Per-request timeout for push and token calls.
    #[serde(default = "default_push_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            body: default_body(),
            topic: default_topic(),
            fcm_project_id: None,
            timeout_secs: default_push_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub notify: NotifySettings,
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut s: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        s.sanitize();
        Ok(s)
    }

    /// Load using env var + fallbacks:
    /// 1) $FIRE_WATCH_SETTINGS_PATH (must exist)
    /// 2) config/fire_watch.toml
    /// 3) built-in defaults
    ///
    /// `FCM_PROJECT_ID` overrides the project id from the file.
    pub fn load_default() -> Result<Self> {
        let mut s = if let Ok(p) = std::env::var(ENV_SETTINGS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SETTINGS_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_PATH);
            if fallback.exists() {
                Self::load_from(&fallback)?
            } else {
                Self::default()
            }
        };

        if let Ok(project) = std::env::var(ENV_FCM_PROJECT_ID) {
            if !project.trim().is_empty() {
                s.notify.fcm_project_id = Some(project.trim().to_string());
            }
        }
        Ok(s)
    }

    fn sanitize(&mut self) {
        self.feed.base_url = self.feed.base_url.trim_end_matches('/').to_string();
        if self.feed.base_url.is_empty() {
            self.feed.base_url = default_feed_base();
        }
        if self.feed.timeout_secs == 0 {
            self.feed.timeout_secs = default_timeout_secs();
        }
        if self.notify.timeout_secs == 0 {
            self.notify.timeout_secs = default_push_timeout_secs();
        }
        if self.notify.topic.trim().is_empty() {
            self.notify.topic = default_topic();
        }
        if self
            .notify
            .fcm_project_id
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            self.notify.fcm_project_id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let s: Settings = toml::from_str("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.notify.topic, "fires");
        assert_eq!(s.schedule.timezone, "Europe/Istanbul");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let s: Settings = toml::from_str(
            r#"
[notify]
title = "Fire!"
"#,
        )
        .unwrap();
        assert_eq!(s.notify.title, "Fire!");
        assert_eq!(s.notify.body, default_body());
        assert_eq!(s.feed.base_url, DEFAULT_FEED_BASE);
    }

    #[test]
    fn notify_timeout_is_read_from_file() {
        let s: Settings = toml::from_str(
            r#"
[feed]
timeout_secs = 45

[notify]
timeout_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(s.feed.timeout_secs, 45);
        assert_eq!(s.notify.timeout_secs, 3);
        assert_eq!(Settings::default().notify.timeout_secs, 10);
    }

    #[test]
    fn sanitize_trims_base_and_blank_topic() {
        let mut s = Settings::default();
        s.feed.base_url = "http://localhost:1234/api/".into();
        s.notify.topic = " ".into();
        s.notify.fcm_project_id = Some("".into());
        s.feed.timeout_secs = 0;
        s.notify.timeout_secs = 0;
        s.sanitize();
        assert_eq!(s.feed.timeout_secs, 30);
        assert_eq!(s.notify.timeout_secs, 10);
        assert_eq!(s.feed.base_url, "http://localhost:1234/api");
        assert_eq!(s.notify.topic, "fires");
        assert_eq!(s.notify.fcm_project_id, None);
    }
}
