use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::{Config, ConfigError};
use super::processor::Processor;
use super::store::EntryStore;
use super::trigger::Trigger;
use super::types::{BucketError, Wake};

struct Shared<K, V> {
    name: String,
    daemon: bool,
    store: EntryStore<K, V>,
    trigger: Trigger,
    dropped: AtomicU64,
    cycles: AtomicU64,
}

struct WorkerHandle {
    cancel: CancellationToken,
    daemon: bool,
    thread: Mutex<Option<JoinHandle<Result<(), BucketError>>>>,
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if self.daemon {
            return;
        }
        if let Some(handle) = self.thread.get_mut().take() {
            // the last handle may be released by the worker itself
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

/// A buffer drained by a single background worker. Clones share the worker.
pub struct Bucket<K, V> {
    shared: Arc<Shared<K, V>>,
    worker: Arc<WorkerHandle>,
}

impl<K, V> Clone for Bucket<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            worker: self.worker.clone(),
        }
    }
}

impl<K, V> Bucket<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Starts the worker thread. Cancelling `cancel` also stops the bucket.
    pub fn new<P>(config: Config, cancel: &CancellationToken, processor: P) -> Result<Self, BucketError>
    where
        P: Processor<V> + 'static,
    {
        let cancel = cancel.child_token();
        let shared = Arc::new(Shared {
            name: config.thread_name.clone(),
            daemon: config.daemon,
            store: EntryStore::new(),
            trigger: Trigger::new(config.settings()),
            dropped: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(BucketError::Spawn)?;
        let worker = Worker {
            shared: Arc::clone(&shared),
            processor,
            cancel: cancel.clone(),
        };
        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || runtime.block_on(worker.run()))
            .map_err(BucketError::Spawn)?;

        Ok(Self {
            shared,
            worker: Arc::new(WorkerHandle {
                cancel,
                daemon: config.daemon,
                thread: Mutex::new(Some(thread)),
            }),
        })
    }

    /// Buffers `value` under `key`. Dropped when the bucket is full.
    pub fn put(&self, key: K, value: V) {
        let max_capacity = self.shared.trigger.settings().max_capacity;
        if self.shared.store.insert(key, value, max_capacity) {
            self.shared.trigger.on_insert(self.shared.store.len());
        } else {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                bucket = %self.shared.name,
                max_capacity,
                "bucket at capacity, entry dropped"
            );
        }
    }
}

impl<K, V> Bucket<K, V>
where
    K: Eq + Hash,
{
    pub fn size(&self) -> usize {
        self.shared.store.len()
    }

    /// Entries dropped so far because the bucket was full.
    pub fn dropped_count(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    pub fn cycle_count(&self) -> u64 {
        self.shared.cycles.load(Ordering::Relaxed)
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        let settings = self.shared.trigger.settings();
        Config {
            thread_name: self.shared.name.clone(),
            daemon: self.shared.daemon,
            flush_interval: settings.flush_interval,
            trigger_size: settings.trigger_size,
            max_capacity: settings.max_capacity,
        }
    }

    pub fn set_flush_interval(&self, flush_interval: Duration) -> Result<(), ConfigError> {
        self.shared.trigger.set_flush_interval(flush_interval)?;
        debug!(bucket = %self.shared.name, ?flush_interval, "flush interval updated");
        Ok(())
    }

    pub fn set_trigger_size(&self, trigger_size: usize) -> Result<(), ConfigError> {
        self.shared.trigger.set_trigger_size(trigger_size)?;
        debug!(bucket = %self.shared.name, trigger_size, "trigger size updated");
        Ok(())
    }

    pub fn set_max_capacity(&self, max_capacity: usize) -> Result<(), ConfigError> {
        self.shared.trigger.set_max_capacity(max_capacity)?;
        debug!(bucket = %self.shared.name, max_capacity, "max capacity updated");
        Ok(())
    }

    /// Token observed by the worker and passed to every processor hook.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.worker.cancel.clone()
    }

    /// Asks the worker to stop. A running cycle still calls `end_cycle`.
    pub fn cancel(&self) {
        self.worker.cancel.cancel();
    }

    /// Whether the worker thread has terminated.
    pub fn is_finished(&self) -> bool {
        self.worker
            .thread
            .lock()
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Blocks until the worker terminates.
    pub fn join(&self) -> Result<(), BucketError> {
        let handle = self
            .worker
            .thread
            .lock()
            .take()
            .ok_or(BucketError::AlreadyJoined)?;
        handle.join().map_err(|_| BucketError::WorkerPanicked)?
    }
}

struct Worker<K, V, P> {
    shared: Arc<Shared<K, V>>,
    processor: P,
    cancel: CancellationToken,
}

impl<K, V, P> Worker<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Send + 'static,
    P: Processor<V>,
{
    async fn run(self) -> Result<(), BucketError> {
        let name = self.shared.name.as_str();
        info!(bucket = %name, "worker started");

        let mut last_cycle = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let wake = self
                .shared
                .trigger
                .wait(|| self.shared.store.len(), last_cycle, &self.cancel)
                .await;
            if wake == Wake::Cancelled {
                break;
            }

            last_cycle = Instant::now();
            if let Err(err) = self.process_cycle(wake).await {
                error!(bucket = %name, error = ?err, "processor failed, worker stopped");
                return Err(err);
            }
        }

        info!(bucket = %name, "worker stopped");
        Ok(())
    }

    async fn process_cycle(&self, wake: Wake) -> Result<(), BucketError> {
        let name = self.shared.name.as_str();
        let cycle = self.shared.cycles.fetch_add(1, Ordering::Relaxed) + 1;

        self.processor.begin_cycle(&self.cancel).await?;

        let values = self.shared.store.drain();
        let drained = values.len();
        debug!(bucket = %name, cycle, ?wake, drained, "processing cycle");

        for (consumed, value) in values.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!(
                    bucket = %name,
                    cycle,
                    discarded = drained - consumed,
                    "cancelled mid-cycle"
                );
                break;
            }
            self.processor.consume(&self.cancel, value).await?;
        }

        self.processor.end_cycle(&self.cancel).await
    }
}

#[cfg(test)]
#[path = "bucket_test.rs"]
mod tests;
