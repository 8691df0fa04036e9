// src/config/mod.rs
//! Two configuration layers:
//! - [`firms`]: feed parameters, re-read from the environment on every tick.
//! - [`settings`]: process settings loaded once at start-up from TOML.

pub mod firms;
pub mod settings;

pub use firms::FirmsConfig;
pub use settings::Settings;
