// src/config/firms.rs
pub const ENV_MAP_KEY: &str = "FIRMS_MAP_KEY";
pub const ENV_SOURCE: &str = "FIRMS_SOURCE";
pub const ENV_AREA: &str = "FIRMS_AREA";
pub const ENV_DAY_RANGE: &str = "FIRMS_DAY_RANGE";
pub const ENV_DATE: &str = "FIRMS_DATE";

pub const DEFAULT_SOURCE: &str = "MODIS_NRT";
pub const DEFAULT_AREA: &str = "world";
pub const DEFAULT_DAY_RANGE: &str = "1";

/// Feed parameters for one tick. Resolved at tick time so a changed
/// environment takes effect on the next tick without a redeploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmsConfig {
    pub map_key: Option<String>,
    pub source: String,
    pub area: String,
    pub day_range: String,
    pub date: Option<String>,
}

impl Default for FirmsConfig {
    fn default() -> Self {
        Self {
            map_key: None,
            source: DEFAULT_SOURCE.to_string(),
            area: DEFAULT_AREA.to_string(),
            day_range: DEFAULT_DAY_RANGE.to_string(),
            date: None,
        }
    }
}

impl FirmsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Blank values count as unset, so
    /// `FIRMS_SOURCE=""` falls back to the default. The map key is kept
    /// byte-for-byte; only the other values are trimmed.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            map_key: lookup(ENV_MAP_KEY).filter(|v| !v.trim().is_empty()),
            source: get(ENV_SOURCE).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            area: get(ENV_AREA).unwrap_or_else(|| DEFAULT_AREA.to_string()),
            day_range: get(ENV_DAY_RANGE).unwrap_or_else(|| DEFAULT_DAY_RANGE.to_string()),
            date: get(ENV_DATE),
        }
    }

    pub fn with_map_key(mut self, key: impl Into<String>) -> Self {
        self.map_key = Some(key.into());
        self
    }
}
