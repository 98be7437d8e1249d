//! Caching proxy example for lazy-registry.
//!
//! Demonstrates:
//! - Modelling the real downloader as an `Operation`
//! - Putting a `MemoizingCache` in front of it without changing callers
//! - Many threads asking for the same video while only one download runs
//!
//! Run with: `cargo run --example video_proxy`

use lazy_registry::{MemoizingCache, Operation};
use std::convert::Infallible;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct RealVideoDownloader;

impl Operation for RealVideoDownloader {
    type Request = str;
    type Key = String;
    type Output = String;
    type Error = Infallible;

    fn key(&self, url: &str) -> String {
        url.to_string()
    }

    fn perform(&self, url: &str) -> Result<String, Infallible> {
        println!("   downloading video from url: {url}");
        thread::sleep(Duration::from_millis(200));
        Ok(format!("Video content from: {url}"))
    }
}

/// Client code only knows about `Operation`.
fn watch<D: Operation<Request = str>>(downloader: &D, url: &str) -> Result<D::Output, D::Error> {
    downloader.perform(url)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazy_registry=debug".into()),
        )
        .init();

    println!("=== lazy-registry: Video Proxy ===\n");

    println!("1. Without a cache, every request downloads:");
    let real = RealVideoDownloader;
    let _ = watch(&real, "http://example.com/video");
    let _ = watch(&real, "http://example.com/video");

    println!("\n2. With a cache, 8 threads x 125 requests download once:");
    let cache = Arc::new(MemoizingCache::new(RealVideoDownloader));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || {
                for _ in 0..125 {
                    let _ = watch(&*cache, "http://example.com/video");
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("   a worker thread panicked");
        }
    }

    let stats = cache.stats();
    println!(
        "   requests={} downloads={} hit_rate={:.3}",
        stats.hits + stats.misses,
        stats.constructions,
        stats.hit_rate()
    );

    println!("\n=== Example completed successfully! ===");
}
