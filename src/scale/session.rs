//! Crawl session state and control.
//!
//! A session tracks one crawl's counters and status. Status follows a small
//! state machine: `running -> paused -> running -> stopped`, with `stopped`
//! terminal; the loop polls a shared control handle at iteration boundaries.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Paused,
    Stopped,
}

const RUNNING: u8 = 0;
const PAUSED: u8 = 1;
const STOPPED: u8 = 2;

/// Cloneable control handle polled by the crawl loop.
///
/// `stop` and `pause` both make the loop exit at the next iteration
/// boundary; `pause` leaves the handler's state intact for a later resume.
/// An in-flight fetch is never interrupted.
#[derive(Debug, Clone)]
pub struct CrawlControl {
    state: Arc<AtomicU8>,
}

impl Default for CrawlControl {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlControl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(RUNNING)),
        }
    }

    /// Stop the session. Terminal; later transitions are rejected.
    pub fn stop(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }

    /// Pause a running session. Rejected from `stopped`.
    pub fn pause(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, PAUSED, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Resume a paused session. Rejected from `stopped`.
    pub fn resume(&self) {
        let _ = self
            .state
            .compare_exchange(PAUSED, RUNNING, Ordering::SeqCst, Ordering::SeqCst);
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self.state.load(Ordering::SeqCst) {
            PAUSED => SessionStatus::Paused,
            STOPPED => SessionStatus::Stopped,
            _ => SessionStatus::Running,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Rearm the handle for a fresh session.
    pub(crate) fn rearm(&self) {
        self.state.store(RUNNING, Ordering::SeqCst);
    }
}

/// State of one crawl session.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    pub session_id: String,
    pub start_time: Instant,
    pub domains: HashSet<String>,
    pub pages_crawled: usize,
    pub pages_total: usize,
    pub items_extracted: usize,
    pub errors: usize,
    pub status: SessionStatus,
    pub last_checkpoint: Option<Instant>,
}

impl CrawlSession {
    /// Start a fresh session targeting `pages_total` pages.
    #[must_use]
    pub fn new(pages_total: usize) -> Self {
        Self {
            session_id: generate_session_id(),
            start_time: Instant::now(),
            domains: HashSet::new(),
            pages_crawled: 0,
            pages_total,
            items_extracted: 0,
            errors: 0,
            status: SessionStatus::Running,
            last_checkpoint: None,
        }
    }

    /// Seconds since the session started (or was resumed).
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

fn generate_session_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}
