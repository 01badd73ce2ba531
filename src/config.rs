//! Editor and client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, ZoneError};

/// Environment variable overriding [`EditorConfig::api_base`].
pub const API_BASE_ENV: &str = "CAMPUS_ZONES_API_BASE";

/// What to do when a poll-driven zone refresh arrives while the store holds
/// unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollConflictPolicy {
    /// Keep local edits; the refresh is skipped and reported as deferred.
    #[default]
    DeferWhileDirty,
    /// Replace the store and baseline, discarding unsaved edits (with a warning).
    Overwrite,
}

/// Configuration for the zone editor and its backend client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Base URL of the zones API.
    /// Default: "http://127.0.0.1:8000"
    pub api_base: String,

    /// Lower bound for the boundary padding slider, in meters.
    /// Default: 50
    pub min_padding_meters: u32,

    /// Upper bound for the boundary padding slider, in meters.
    /// Default: 300
    pub max_padding_meters: u32,

    /// Padding used until the campus reports its own value.
    /// Default: 100
    pub default_padding_meters: u32,

    /// Per-request timeout in seconds. Default: 30
    pub request_timeout_secs: u64,

    /// Retries for idempotent requests on transport errors, 429 and 5xx.
    /// Default: 3
    pub max_retries: u32,

    /// Interval between scan-status polls in seconds. Default: 10
    pub poll_interval_secs: u64,

    /// Give up polling after this many seconds. Default: 300
    pub poll_timeout_secs: u64,

    /// A draw click within this distance of the first vertex closes the ring.
    /// Default: 1.0 meters
    pub draw_close_tolerance_meters: f64,

    /// Maximum vertices a drawn zone may have. Default: 20
    pub max_vertices: usize,

    /// Policy for poll-driven refreshes over unsaved edits.
    /// Default: DeferWhileDirty
    pub poll_conflict_policy: PollConflictPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".to_string(),
            min_padding_meters: 50,
            max_padding_meters: 300,
            default_padding_meters: 100,
            request_timeout_secs: 30,
            max_retries: 3,
            poll_interval_secs: 10,
            poll_timeout_secs: 300,
            draw_close_tolerance_meters: 1.0,
            max_vertices: 20,
            poll_conflict_policy: PollConflictPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Default configuration with `api_base` taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            let base = base.trim();
            if !base.is_empty() {
                config.api_base = base.trim_end_matches('/').to_string();
            }
        }
        config
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_padding_range(mut self, min: u32, max: u32) -> Self {
        self.min_padding_meters = min;
        self.max_padding_meters = max;
        self
    }

    pub fn with_poll_conflict_policy(mut self, policy: PollConflictPolicy) -> Self {
        self.poll_conflict_policy = policy;
        self
    }

    pub fn with_poll_timing(mut self, interval_secs: u64, timeout_secs: u64) -> Self {
        self.poll_interval_secs = interval_secs;
        self.poll_timeout_secs = timeout_secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Clamp a padding value into the configured slider range.
    pub fn clamp_padding(&self, meters: u32) -> u32 {
        meters.clamp(self.min_padding_meters, self.max_padding_meters)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.api_base.is_empty() {
            return Err(ZoneError::Config("api_base must not be empty".to_string()));
        }
        if self.min_padding_meters > self.max_padding_meters {
            return Err(ZoneError::Config(format!(
                "padding range {}..{} is empty",
                self.min_padding_meters, self.max_padding_meters
            )));
        }
        if self.default_padding_meters < self.min_padding_meters
            || self.default_padding_meters > self.max_padding_meters
        {
            return Err(ZoneError::Config(format!(
                "default padding {} outside {}..{}",
                self.default_padding_meters, self.min_padding_meters, self.max_padding_meters
            )));
        }
        if self.max_vertices < crate::Ring::MIN_POINTS {
            return Err(ZoneError::Config(format!(
                "max_vertices must be at least {}",
                crate::Ring::MIN_POINTS
            )));
        }
        if self.draw_close_tolerance_meters.is_nan() || self.draw_close_tolerance_meters < 0.0 {
            return Err(ZoneError::Config(
                "draw_close_tolerance_meters must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
