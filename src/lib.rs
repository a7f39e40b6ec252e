//! # buffered-bucket
//!
//! A background buffered batch-processing worker built on Tokio and Rust.
//!
//! ## Features
//!
//! - **Key/value buffering** with last-write-wins per key
//! - **Size and interval triggers** that wake a single dedicated worker
//! - **Capacity drop policy**: producers never block, entries past capacity are dropped
//! - **Graceful cancellation** via [`tokio_util::sync::CancellationToken`]
//! - **Dynamic reconfiguration** validated at every mutation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buffered_bucket::bucket::{Bucket, BucketError, ConfigBuilder};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ConfigBuilder::default()
//!     .thread_name("metrics-flusher")
//!     .trigger_size(100)
//!     .flush_interval(Duration::from_secs(5))
//!     .build()?;
//!
//! let cancel = CancellationToken::new();
//! let bucket = Bucket::new(config, &cancel, |_ctx: &CancellationToken, value: u64| async move {
//!     println!("flushing {value}");
//!     Ok::<(), BucketError>(())
//! })?;
//!
//! bucket.put("requests", 42);
//! bucket.cancel();
//! bucket.join()?;
//! ```
//!
//! ## Modules
//!
//! - [`bucket`] - Buffering, triggering and the worker lifecycle

pub mod bucket;
