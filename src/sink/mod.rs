//! Sink interfaces through which the crawl loop reports outward.
//!
//! Each sink is a single-method trait invoked on the crawl task; callers
//! who need to block or buffer wrap their sink accordingly. No-op and
//! collecting implementations cover the common cases.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::extract::Item;
use crate::scale::checkpoint::Checkpoint;

/// Progress snapshot delivered at least every ten pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub pages_crawled: usize,
    pub pages_total: usize,
    pub progress_pct: f64,
    pub items_extracted: usize,
    pub errors: usize,
    pub pages_per_sec: f64,
    pub eta_seconds: f64,
}

/// Receives each valid extracted item.
pub trait ResultSink: Send + Sync {
    fn on_item(&self, item: &Item);
}

/// Receives progress snapshots during the crawl.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Receives checkpoint blobs for external persistence.
pub trait CheckpointSink: Send + Sync {
    fn on_checkpoint(&self, checkpoint: &Checkpoint);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ResultSink for NoOpSink {
    #[inline(always)]
    fn on_item(&self, _item: &Item) {}
}

impl ProgressSink for NoOpSink {
    #[inline(always)]
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
}

impl CheckpointSink for NoOpSink {
    #[inline(always)]
    fn on_checkpoint(&self, _checkpoint: &Checkpoint) {}
}

/// Result sink that accumulates items in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    items: Mutex<Vec<Item>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().map(|items| items.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for CollectingSink {
    fn on_item(&self, item: &Item) {
        if let Ok(mut items) = self.items.lock() {
            items.push(item.clone());
        }
    }
}

/// Checkpoint sink that keeps blobs in memory, newest last.
#[derive(Debug, Default)]
pub struct MemoryCheckpointSink {
    checkpoints: Mutex<Vec<Checkpoint>>,
}

impl MemoryCheckpointSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latest(&self) -> Option<Checkpoint> {
        self.checkpoints
            .lock()
            .ok()
            .and_then(|cps| cps.last().cloned())
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.checkpoints.lock().map(|cps| cps.len()).unwrap_or(0)
    }
}

impl CheckpointSink for MemoryCheckpointSink {
    fn on_checkpoint(&self, checkpoint: &Checkpoint) {
        if let Ok(mut checkpoints) = self.checkpoints.lock() {
            checkpoints.push(checkpoint.clone());
        }
    }
}

/// Progress sink that remembers the latest snapshot.
#[derive(Debug, Default)]
pub struct LatestProgressSink {
    snapshot: Mutex<Option<ProgressSnapshot>>,
}

impl LatestProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latest(&self) -> Option<ProgressSnapshot> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }
}

impl ProgressSink for LatestProgressSink {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        if let Ok(mut slot) = self.snapshot.lock() {
            *slot = Some(snapshot.clone());
        }
    }
}
