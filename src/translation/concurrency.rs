/*!
 * Request pacing and cancellation for batch runs.
 *
 * Chapters are translated one after another with a fixed pause between them
 * to stay under upstream rate limits. The pause goes through the `Pacer` trait
 * so tests can observe it without sleeping.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

/// Default pause between chapters
pub const DEFAULT_DELAY_MS: u64 = 4000;

/// Default number of fallback title requests in flight at once
pub const DEFAULT_TITLE_CONCURRENCY: usize = 4;

/// Waits between consecutive chapter requests
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Pause for the given duration
    async fn pause(&self, delay: Duration);
}

/// Pacer backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Pacer that records requested pauses and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in order
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }

    /// Number of pauses requested so far
    pub fn pause_count(&self) -> usize {
        self.pauses.lock().len()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        self.pauses.lock().push(delay);
    }
}

/// Cooperative cancellation shared between a batch run and its caller
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the batch stops at its next checkpoint
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parse a user-supplied delay in milliseconds; unparseable or zero means the default
pub fn parse_delay_ms(value: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => DEFAULT_DELAY_MS,
        Ok(ms) => ms,
    }
}
