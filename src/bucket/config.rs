// src/bucket/config.rs

use derive_builder::{Builder, UninitializedFieldError};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_THREAD_NAME: &str = "bucket-worker";
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_TRIGGER_SIZE: usize = 10_000;

/// Rejected configuration values.
///
/// Returned synchronously from [`ConfigBuilder::build`] and from every runtime
/// setter on [`Bucket`](super::Bucket). The previous valid values stay in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("trigger size {trigger_size} exceeds max capacity {max_capacity}")]
    TriggerExceedsCapacity {
        trigger_size: usize,
        max_capacity: usize,
    },

    #[error("flush interval must be greater than zero")]
    ZeroFlushInterval,

    #[error("thread name must not contain NUL bytes")]
    InvalidThreadName,

    #[error("field `{0}` was not initialized")]
    UninitializedField(&'static str),
}

impl From<UninitializedFieldError> for ConfigError {
    fn from(err: UninitializedFieldError) -> Self {
        ConfigError::UninitializedField(err.field_name())
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate", error = "ConfigError"))]
pub struct Config {
    /// Name given to the worker thread
    #[builder(setter(into), default = "DEFAULT_THREAD_NAME.to_string()")]
    pub(crate) thread_name: String,

    /// Detach the worker instead of waiting for it when the last handle drops
    #[builder(default = "false")]
    pub(crate) daemon: bool,

    /// Maximum time between the start of two consecutive cycles
    #[builder(default = "DEFAULT_FLUSH_INTERVAL")]
    pub(crate) flush_interval: Duration,

    /// Occupancy that wakes the worker ahead of the flush interval
    #[builder(default = "DEFAULT_TRIGGER_SIZE")]
    pub(crate) trigger_size: usize,

    /// Hard ceiling past which new entries are dropped
    #[builder(default = "self.default_max_capacity()")]
    pub(crate) max_capacity: usize,
}

impl ConfigBuilder {
    fn effective_trigger_size(&self) -> usize {
        self.trigger_size.unwrap_or(DEFAULT_TRIGGER_SIZE)
    }

    // twice the default trigger size, or twice a larger configured one
    fn default_max_capacity(&self) -> usize {
        self.effective_trigger_size()
            .max(DEFAULT_TRIGGER_SIZE)
            .saturating_mul(2)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_interval == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroFlushInterval);
        }
        if self
            .thread_name
            .as_ref()
            .is_some_and(|name| name.contains('\0'))
        {
            return Err(ConfigError::InvalidThreadName);
        }
        let trigger_size = self.effective_trigger_size();
        let max_capacity = self
            .max_capacity
            .unwrap_or_else(|| self.default_max_capacity());
        Settings::check_bounds(trigger_size, max_capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            daemon: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            trigger_size: DEFAULT_TRIGGER_SIZE,
            max_capacity: DEFAULT_TRIGGER_SIZE * 2,
        }
    }
}

impl Config {
    /// Returns the worker thread name
    #[inline]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Returns whether the worker is detached on drop
    #[inline]
    pub fn daemon(&self) -> bool {
        self.daemon
    }

    /// Returns the flush interval
    #[inline]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Returns the occupancy that triggers an early cycle
    #[inline]
    pub fn trigger_size(&self) -> usize {
        self.trigger_size
    }

    /// Returns the maximum number of buffered entries
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub(crate) fn settings(&self) -> Settings {
        Settings {
            flush_interval: self.flush_interval,
            trigger_size: self.trigger_size,
            max_capacity: self.max_capacity,
        }
    }
}

/// The mutable part of a [`Config`], owned by the trigger once the worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) flush_interval: Duration,
    pub(crate) trigger_size: usize,
    pub(crate) max_capacity: usize,
}

impl Settings {
    fn check_bounds(trigger_size: usize, max_capacity: usize) -> Result<(), ConfigError> {
        if trigger_size > max_capacity {
            return Err(ConfigError::TriggerExceedsCapacity {
                trigger_size,
                max_capacity,
            });
        }
        Ok(())
    }

    pub(crate) fn with_flush_interval(self, flush_interval: Duration) -> Result<Self, ConfigError> {
        if flush_interval.is_zero() {
            return Err(ConfigError::ZeroFlushInterval);
        }
        Ok(Settings {
            flush_interval,
            ..self
        })
    }

    pub(crate) fn with_trigger_size(self, trigger_size: usize) -> Result<Self, ConfigError> {
        Self::check_bounds(trigger_size, self.max_capacity)?;
        Ok(Settings {
            trigger_size,
            ..self
        })
    }

    pub(crate) fn with_max_capacity(self, max_capacity: usize) -> Result<Self, ConfigError> {
        Self::check_bounds(self.trigger_size, max_capacity)?;
        Ok(Settings {
            max_capacity,
            ..self
        })
    }
}
