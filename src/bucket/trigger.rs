use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::config::{ConfigError, Settings};
use super::types::Wake;

/// Runtime settings plus the signal that wakes the worker.
pub(crate) struct Trigger {
    settings: RwLock<Settings>,
    wake: Notify,
}

impl Trigger {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            wake: Notify::new(),
        }
    }

    pub(crate) fn settings(&self) -> Settings {
        *self.settings.read()
    }

    /// Wakes the worker if `size` satisfies the size predicate.
    pub(crate) fn on_insert(&self, size: usize) {
        if Self::size_reached(size, self.settings.read().trigger_size) {
            self.wake.notify_one();
        }
    }

    pub(crate) fn set_flush_interval(&self, flush_interval: Duration) -> Result<(), ConfigError> {
        let previous = self.update(|s| s.with_flush_interval(flush_interval))?;
        if flush_interval < previous.flush_interval {
            self.wake.notify_one();
        }
        Ok(())
    }

    pub(crate) fn set_trigger_size(&self, trigger_size: usize) -> Result<(), ConfigError> {
        let previous = self.update(|s| s.with_trigger_size(trigger_size))?;
        if trigger_size < previous.trigger_size {
            self.wake.notify_one();
        }
        Ok(())
    }

    pub(crate) fn set_max_capacity(&self, max_capacity: usize) -> Result<(), ConfigError> {
        self.update(|s| s.with_max_capacity(max_capacity))?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<Settings, ConfigError>
    where
        F: FnOnce(Settings) -> Result<Settings, ConfigError>,
    {
        let mut settings = self.settings.write();
        let previous = *settings;
        *settings = mutate(previous)?;
        Ok(previous)
    }

    // last_cycle is when the previous cycle started
    pub(crate) async fn wait<S>(
        &self,
        size: S,
        last_cycle: Instant,
        cancel: &CancellationToken,
    ) -> Wake
    where
        S: Fn() -> usize,
    {
        loop {
            let settings = self.settings();
            if Self::size_reached(size(), settings.trigger_size) {
                return Wake::SizeReached;
            }
            // an interval too large to represent never elapses
            let deadline = last_cycle.checked_add(settings.flush_interval);
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Wake::IntervalElapsed;
            }
            let timeout = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => return Wake::Cancelled,
                _ = self.wake.notified() => {}
                _ = timeout => {}
            }
        }
    }

    // An empty buffer never satisfies the size predicate, otherwise a zero
    // trigger size would spin.
    fn size_reached(size: usize, trigger_size: usize) -> bool {
        size > 0 && size >= trigger_size
    }
}
