use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one stream publisher, updated from the block path
#[derive(Debug, Default)]
pub struct PublisherMetrics {
    frames_published: AtomicU64,
    bytes_published: AtomicU64,
    empty_blocks: AtomicU64,
    dropped_blocks: AtomicU64,
    send_errors: AtomicU64,
    bind_errors: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

/// Point-in-time copy of [`PublisherMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub frames_published: u64,
    pub bytes_published: u64,
    pub empty_blocks: u64,
    pub dropped_blocks: u64,
    pub send_errors: u64,
    pub bind_errors: u64,
    pub avg_latency_us: u64,
}

impl PublisherMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks.load(Ordering::Relaxed)
    }

    pub fn send_errors(&self) -> u64 {
        self.send_errors.load(Ordering::Relaxed)
    }

    pub fn record_published(&self, bytes: usize) {
        self.frames_published.fetch_add(1, Ordering::Relaxed);
        self.bytes_published.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_empty_block(&self) {
        self.empty_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_block(&self) {
        self.dropped_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_error(&self) {
        self.send_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bind_error(&self) {
        self.bind_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_processing(&self) -> Instant {
        Instant::now()
    }

    /// Record encode + send time for one frame
    pub fn finish_processing(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_published: self.frames_published(),
            bytes_published: self.bytes_published.load(Ordering::Relaxed),
            empty_blocks: self.empty_blocks.load(Ordering::Relaxed),
            dropped_blocks: self.dropped_blocks(),
            send_errors: self.send_errors(),
            bind_errors: self.bind_errors.load(Ordering::Relaxed),
            avg_latency_us: self.avg_latency_us(),
        }
    }
}
