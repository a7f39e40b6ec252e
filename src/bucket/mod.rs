pub mod bucket;
pub mod config;
pub mod processor;
pub(crate) mod store;
pub(crate) mod trigger;
pub mod types;

pub use bucket::Bucket;
pub use config::{Config, ConfigBuilder, ConfigError};
pub use processor::Processor;
pub use types::BucketError;
