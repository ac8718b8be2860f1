//! FIFO crawl queue with visited-set deduplication.
//!
//! A URL enters the queue at most once per session: `add` consults the
//! queue's seen set, which only grows. Depth is recorded at `add` time as
//! parent depth + 1 (seeds are depth 0) so the crawl loop can enforce its
//! depth cap without re-deriving anything from the URL.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Serialized queue state; preserves FIFO order and the visited set.
///
/// The `depths` map is a backward-compatible addition to the original
/// `{queue, visited}` layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub queue: Vec<String>,
    pub visited: Vec<String>,
    #[serde(default)]
    pub depths: HashMap<String, u32>,
}

/// FIFO queue of URLs pending crawl.
#[derive(Debug, Default)]
pub struct CrawlQueue {
    queue: VecDeque<String>,
    visited: HashSet<String>,
    depths: HashMap<String, u32>,
}

impl CrawlQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a seed URL at depth 0. Idempotent against the visited set.
    pub fn add(&mut self, url: &str) {
        self.add_with_parent(url, None);
    }

    /// Add a URL discovered on `parent`, at parent depth + 1.
    ///
    /// Empty URLs and URLs already seen this session are ignored.
    pub fn add_with_parent(&mut self, url: &str, parent: Option<&str>) {
        if url.is_empty() {
            return;
        }
        if !self.visited.insert(url.to_string()) {
            return;
        }
        let depth = parent
            .and_then(|p| self.depths.get(p))
            .map_or(0, |d| d + 1);
        self.depths.insert(url.to_string(), depth);
        self.queue.push_back(url.to_string());
    }

    /// Pop the next URL in FIFO order.
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of URLs still pending.
    #[must_use]
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Depth recorded for a URL at `add` time (0 for unknown URLs).
    #[must_use]
    pub fn depth(&self, url: &str) -> u32 {
        self.depths.get(url).copied().unwrap_or(0)
    }

    /// Whether a URL has ever been added this session.
    #[must_use]
    pub fn seen(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Snapshot the queue for checkpointing.
    #[must_use]
    pub fn serialize(&self) -> QueueSnapshot {
        QueueSnapshot {
            queue: self.queue.iter().cloned().collect(),
            visited: self.visited.iter().cloned().collect(),
            depths: self.depths.clone(),
        }
    }

    /// Restore a queue from a snapshot, replacing current state.
    #[must_use]
    pub fn deserialize(snapshot: QueueSnapshot) -> Self {
        Self {
            queue: snapshot.queue.into(),
            visited: snapshot.visited.into_iter().collect(),
            depths: snapshot.depths,
        }
    }

    /// Drop all state, including the visited set.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.visited.clear();
        self.depths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut q = CrawlQueue::new();
        q.add("https://a.com/1");
        q.add("https://a.com/2");
        q.add("https://a.com/3");
        assert_eq!(q.pop().as_deref(), Some("https://a.com/1"));
        assert_eq!(q.pop().as_deref(), Some("https://a.com/2"));
        assert_eq!(q.pop().as_deref(), Some("https://a.com/3"));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn add_is_idempotent() {
        let mut q = CrawlQueue::new();
        q.add("https://a.com/1");
        q.add("https://a.com/1");
        assert_eq!(q.size(), 1);
        // Still deduplicated after the URL has been popped.
        q.pop();
        q.add("https://a.com/1");
        assert!(!q.has_next());
    }

    #[test]
    fn depth_tracks_parent_chain() {
        let mut q = CrawlQueue::new();
        q.add("https://a.com/seed");
        q.add_with_parent("https://a.com/p2", Some("https://a.com/seed"));
        q.add_with_parent("https://a.com/p3", Some("https://a.com/p2"));
        assert_eq!(q.depth("https://a.com/seed"), 0);
        assert_eq!(q.depth("https://a.com/p2"), 1);
        assert_eq!(q.depth("https://a.com/p3"), 2);
    }

    #[test]
    fn serialize_round_trip() {
        let mut q = CrawlQueue::new();
        q.add("https://a.com/1");
        q.add("https://a.com/2");
        q.add_with_parent("https://a.com/3", Some("https://a.com/2"));
        q.pop();

        let snapshot = q.serialize();
        let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
        let restored: QueueSnapshot = serde_json::from_str(&json).expect("snapshot parses");
        let mut r = CrawlQueue::deserialize(restored);

        assert_eq!(r.size(), 2);
        assert_eq!(r.pop().as_deref(), Some("https://a.com/2"));
        assert_eq!(r.pop().as_deref(), Some("https://a.com/3"));
        assert_eq!(r.depth("https://a.com/3"), 1);
        // Visited set survives: the popped seed cannot be re-added.
        r.add("https://a.com/1");
        assert!(!r.has_next());
    }

    #[test]
    fn reset_clears_everything() {
        let mut q = CrawlQueue::new();
        q.add("https://a.com/1");
        q.reset();
        assert!(!q.has_next());
        q.add("https://a.com/1");
        assert!(q.has_next());
    }
}
