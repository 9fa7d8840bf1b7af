//! Settings for tplsub.
//!
//! This module provides the [`Settings`] struct, which holds the options that
//! shape a render: logging, the time zone used by `now`, and which template
//! functions are withheld from the registry. Settings are always passed
//! explicitly; there is no process-wide settings instance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TplError;

/// The time zone that `now` reports in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    /// Coordinated Universal Time.
    Utc,
    /// The host's local time zone.
    #[default]
    Local,
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("utc"),
            Self::Local => f.write_str("local"),
        }
    }
}

impl FromStr for TimeZoneSetting {
    type Err = TplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(TplError::ConfigurationError(format!(
                "unknown time zone '{other}' (expected 'utc' or 'local')"
            ))),
        }
    }
}

/// The complete set of tplsub settings.
///
/// # Examples
///
/// ```
/// use tplsub_core::settings::{Settings, TimeZoneSetting};
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.log_level, "warn");
/// assert_eq!(settings.time_zone, TimeZoneSetting::Local);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty instead of JSON log output).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "`tplsub_template=trace`").
    pub log_level: String,

    // ── Functions ────────────────────────────────────────────────────

    /// The time zone `now` reports in.
    pub time_zone: TimeZoneSetting,
    /// Function names the registry builder leaves out.
    pub disabled_functions: Vec<String>,
}

impl Settings {
    /// Returns `true` if the named function is disabled.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_functions.iter().any(|d| d == name)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "warn".to_string(),
            time_zone: TimeZoneSetting::Local,
            disabled_functions: Vec::new(),
        }
    }
}
