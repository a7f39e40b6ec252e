//! Simple bucket example aggregating page views from several producer threads.
//!
//! Run with: cargo run --example simple_bucket

use async_trait::async_trait;
use buffered_bucket::bucket::{Bucket, BucketError, ConfigBuilder, Processor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Prints every flushed value, bracketed by the cycle hooks
#[derive(Default)]
struct PrintingProcessor {
    flushed: AtomicU64,
}

#[async_trait]
impl Processor<u64> for PrintingProcessor {
    async fn begin_cycle(&self, _ctx: &CancellationToken) -> Result<(), BucketError> {
        println!("-- cycle start");
        Ok(())
    }

    async fn consume(&self, ctx: &CancellationToken, views: u64) -> Result<(), BucketError> {
        if ctx.is_cancelled() {
            return Ok(());
        }
        self.flushed.fetch_add(views, Ordering::Relaxed);
        println!("   page views: {}", views);
        // Simulate a slow bulk write
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(())
    }

    async fn end_cycle(&self, _ctx: &CancellationToken) -> Result<(), BucketError> {
        println!("-- cycle end, {} views flushed so far", self.flushed.load(Ordering::Relaxed));
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = ConfigBuilder::default()
        .thread_name("page-view-flusher")
        .trigger_size(8)
        .max_capacity(16)
        .flush_interval(Duration::from_millis(500))
        .build()?;

    let cancel = CancellationToken::new();
    let bucket: Bucket<String, u64> = Bucket::new(config, &cancel, PrintingProcessor::default())?;

    println!("Starting bucket worker...");
    println!("- Trigger size: 8");
    println!("- Max capacity: 16");
    println!("- Flush interval: 500ms\n");

    // Producers: each thread reports views for its own pages
    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let bucket = bucket.clone();
            thread::spawn(move || {
                for page in 0..10u64 {
                    bucket.put(format!("producer-{producer}/page-{page}"), page * 10);
                    thread::sleep(Duration::from_millis(20));
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().map_err(|_| "producer panicked")?;
    }

    // Let the interval pick up whatever is left, then stop
    thread::sleep(Duration::from_millis(600));
    cancel.cancel();
    bucket.join()?;

    println!(
        "\nBucket worker stopped ({} cycles, {} entries dropped)",
        bucket.cycle_count(),
        bucket.dropped_count()
    );
    Ok(())
}
