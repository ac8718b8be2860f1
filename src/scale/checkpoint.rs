//! Checkpoint blobs for resumable sessions.
//!
//! A checkpoint snapshots everything needed to continue a crawl elsewhere:
//! session identity, counters, the serialized queue (with its own seen set),
//! the handler's visited set, and the domains touched. Additions to this
//! layout must not change existing keys.

use serde::{Deserialize, Serialize};

use crate::queue::QueueSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub session_id: String,
    pub pages_crawled: usize,
    pub items_extracted: usize,
    pub queue: QueueSnapshot,
    pub visited: Vec<String>,
    pub domains: Vec<String>,
    /// ISO-8601 creation time
    pub timestamp: String,
}

impl Checkpoint {
    /// Serialize to the JSON wire form handed to checkpoint sinks.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails (it should not for this
    /// layout).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a checkpoint back from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns an error when the blob does not match the checkpoint layout.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn json_round_trip() {
        let checkpoint = Checkpoint {
            session_id: "abc123def456".into(),
            pages_crawled: 42,
            items_extracted: 310,
            queue: QueueSnapshot {
                queue: vec!["https://e.com/p3".into()],
                visited: vec!["https://e.com/p1".into(), "https://e.com/p3".into()],
                depths: HashMap::from([("https://e.com/p3".to_string(), 1)]),
            },
            visited: vec!["https://e.com/p1".into()],
            domains: vec!["e.com".into()],
            timestamp: "2026-08-01T12:00:00+00:00".into(),
        };

        let json = checkpoint.to_json().expect("serializes");
        let parsed = Checkpoint::from_json(&json).expect("parses");
        assert_eq!(parsed, checkpoint);
    }

    #[test]
    fn legacy_blobs_without_depths_still_parse() {
        let json = r#"{
            "session_id": "abc",
            "pages_crawled": 1,
            "items_extracted": 2,
            "queue": {"queue": ["https://e.com/p2"], "visited": ["https://e.com/p1"]},
            "visited": ["https://e.com/p1"],
            "domains": ["e.com"],
            "timestamp": "2026-08-01T12:00:00+00:00"
        }"#;
        let parsed = Checkpoint::from_json(json).expect("parses without depths");
        assert!(parsed.queue.depths.is_empty());
    }
}
