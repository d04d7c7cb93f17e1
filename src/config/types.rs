//! Typed configuration structures
//!
//! Provides strongly-typed access to configuration values with validation
//! and default values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::logging::LoggingConfig;
use crate::polls::poll::{
    DEFAULT_WINDOW_SECONDS, MAX_OPTIONS, MAX_WINDOW_SECONDS, MIN_WINDOW_SECONDS,
};
use crate::polls::WindowPolicy;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Poll creation limits and the simulated latency hook
    #[serde(default)]
    pub polls: PollsConfig,

    /// Voting window clock
    #[serde(default)]
    pub clock: ClockConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();
        let mut fail = |path: &str, message: String| {
            errors.push(ConfigValidationError {
                path: path.to_string(),
                message,
            })
        };

        let polls = &self.polls;
        if polls.min_window_seconds == 0 {
            fail("polls.minWindowSeconds", "must be at least 1".to_string());
        }
        if polls.min_window_seconds > polls.max_window_seconds {
            fail(
                "polls.minWindowSeconds",
                format!(
                    "{} exceeds maxWindowSeconds {}",
                    polls.min_window_seconds, polls.max_window_seconds
                ),
            );
        }
        if polls.default_window_seconds < polls.min_window_seconds
            || polls.default_window_seconds > polls.max_window_seconds
        {
            fail(
                "polls.defaultWindowSeconds",
                format!(
                    "{} is outside {}..={}",
                    polls.default_window_seconds,
                    polls.min_window_seconds,
                    polls.max_window_seconds
                ),
            );
        }
        if polls.max_options < 2 {
            fail("polls.maxOptions", "must be at least 2".to_string());
        }
        if self.clock.tick_interval_ms == 0 {
            fail("clock.tickIntervalMs", "must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Poll configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollsConfig {
    /// Window used when a poll is created without one
    #[serde(default = "default_window")]
    pub default_window_seconds: u32,

    #[serde(default = "default_min_window")]
    pub min_window_seconds: u32,

    #[serde(default = "default_max_window")]
    pub max_window_seconds: u32,

    #[serde(default = "default_max_options")]
    pub max_options: usize,

    /// Artificial delay before create/vote complete (0 = off)
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

fn default_window() -> u32 {
    DEFAULT_WINDOW_SECONDS
}

fn default_min_window() -> u32 {
    MIN_WINDOW_SECONDS
}

fn default_max_window() -> u32 {
    MAX_WINDOW_SECONDS
}

fn default_max_options() -> usize {
    MAX_OPTIONS
}

impl Default for PollsConfig {
    fn default() -> Self {
        Self {
            default_window_seconds: default_window(),
            min_window_seconds: default_min_window(),
            max_window_seconds: default_max_window(),
            max_options: default_max_options(),
            simulated_latency_ms: 0,
        }
    }
}

impl PollsConfig {
    pub fn window_policy(&self) -> WindowPolicy {
        WindowPolicy {
            default_seconds: self.default_window_seconds,
            min_seconds: self.min_window_seconds,
            max_seconds: self.max_window_seconds,
            max_options: self.max_options,
        }
    }

    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }
}

/// Clock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    /// Wall time per window second
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl ClockConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
