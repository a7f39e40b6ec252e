// src/bucket/processor.rs

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::types::BucketError;

/// Hooks the worker drives once per cycle: `begin_cycle`, then `consume`
/// for every drained value, then `end_cycle`.
///
/// Every hook gets the bucket's cancellation token and should return
/// promptly once it fires. An `Err` from any hook stops the worker for good.
#[async_trait]
pub trait Processor<V>: Send + Sync
where
    V: Send + 'static,
{
    async fn begin_cycle(&self, _cancel: &CancellationToken) -> Result<(), BucketError> {
        Ok(())
    }

    async fn consume(&self, cancel: &CancellationToken, value: V) -> Result<(), BucketError>;

    async fn end_cycle(&self, _cancel: &CancellationToken) -> Result<(), BucketError> {
        Ok(())
    }
}

#[async_trait]
impl<V, F, Fut> Processor<V> for F
where
    F: Fn(&CancellationToken, V) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<(), BucketError>> + Send + 'static,
    V: Send + 'static,
{
    async fn consume(&self, ctx: &CancellationToken, value: V) -> Result<(), BucketError> {
        self(ctx, value).await
    }
}
