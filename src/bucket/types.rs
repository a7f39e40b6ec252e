use thiserror::Error;

use super::config::ConfigError;

/// Errors that can occur while running a bucket.
#[derive(Debug, Error)]
pub enum BucketError {
    /// A processor hook failed.
    ///
    /// Fatal to the worker. Preserves the source error for debugging.
    #[error("processor failed")]
    ProcessorError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The configuration was rejected.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// The worker thread or its runtime could not be started.
    #[error("failed to start worker")]
    Spawn(#[source] std::io::Error),

    /// A processor hook panicked and took the worker down with it.
    #[error("worker panicked")]
    WorkerPanicked,

    /// The worker outcome was already collected by an earlier `join`.
    #[error("worker already joined")]
    AlreadyJoined,
}

impl BucketError {
    /// Wraps any error raised inside a processor hook.
    pub fn processor<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        BucketError::ProcessorError(err.into())
    }
}

/// Why the worker stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
    /// Occupancy reached the trigger size.
    SizeReached,
    /// The flush interval elapsed since the last cycle started.
    IntervalElapsed,
    /// The cancellation token fired.
    Cancelled,
}
