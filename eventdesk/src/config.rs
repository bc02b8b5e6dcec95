//! Configuration management for EventDesk.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A delay variable was not a whole number of milliseconds
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidDelay {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
    /// Unknown selection policy
    #[error("{var} must be `prune` or `retain`, got {value:?}")]
    InvalidPolicy {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// What happens to selected attendees that a narrower filter hides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Drop hidden ids from the selection whenever the filter changes
    #[default]
    PruneOnFilterChange,
    /// Keep hidden ids selected
    Retain,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prune" => Ok(Self::PruneOnFilterChange),
            "retain" => Ok(Self::Retain),
            other => Err(other.to_string()),
        }
    }
}

/// Simulated latency of each backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delays {
    /// Sign in
    pub login: Duration,
    /// Event save
    pub save: Duration,
    /// Bulk message delivery
    pub send: Duration,
    /// Public registration
    pub register: Duration,
}

impl Delays {
    /// No latency at all, for tests
    #[must_use]
    pub const fn none() -> Self {
        Self {
            login: Duration::ZERO,
            save: Duration::ZERO,
            send: Duration::ZERO,
            register: Duration::ZERO,
        }
    }
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(1000),
            save: Duration::from_millis(1000),
            send: Duration::from_millis(1000),
            register: Duration::from_millis(1500),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the signed-in session record is kept
    pub session_path: PathBuf,
    /// Where organizer settings are kept
    pub settings_path: PathBuf,
    /// Simulated backend latency
    pub delays: Delays,
    /// Selection handling on filter changes
    pub selection_policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_path: PathBuf::from(".eventdesk/session.json"),
            settings_path: PathBuf::from(".eventdesk/settings.json"),
            delays: Delays::default(),
            selection_policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unset variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let delay = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigError::InvalidDelay { var, value }),
            }
        };

        let selection_policy = match lookup("EVENTDESK_SELECTION_POLICY") {
            None => defaults.selection_policy,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPolicy {
                var: "EVENTDESK_SELECTION_POLICY",
                value,
            })?,
        };

        Ok(Self {
            session_path: lookup("EVENTDESK_SESSION_PATH")
                .map_or(defaults.session_path, PathBuf::from),
            settings_path: lookup("EVENTDESK_SETTINGS_PATH")
                .map_or(defaults.settings_path, PathBuf::from),
            delays: Delays {
                login: delay("EVENTDESK_LOGIN_DELAY_MS", defaults.delays.login)?,
                save: delay("EVENTDESK_SAVE_DELAY_MS", defaults.delays.save)?,
                send: delay("EVENTDESK_SEND_DELAY_MS", defaults.delays.send)?,
                register: delay("EVENTDESK_REGISTER_DELAY_MS", defaults.delays.register)?,
            },
            selection_policy,
        })
    }

    /// Replace all delays with zero
    #[must_use]
    pub const fn without_delays(mut self) -> Self {
        self.delays = Delays::none();
        self
    }
}
