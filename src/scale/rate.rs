//! Per-host rate limiting for politeness.
//!
//! Enforces a minimum interval between any two requests to the same host:
//! wait out the remainder of the interval, then stamp the host with the
//! current time. Hosts are independent of each other.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct RateState {
    last_request: HashMap<String, Instant>,
    min_interval: Duration,
}

impl RateState {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: HashMap::new(),
            min_interval,
        }
    }

    /// Sleep until the host's minimum interval has passed, then stamp it.
    pub async fn wait(&mut self, host: &str) {
        if let Some(last) = self.last_request.get(host) {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request.insert(host.to_string(), Instant::now());
    }

    /// Number of hosts with a recorded request.
    #[must_use]
    pub fn tracked_hosts(&self) -> usize {
        self.last_request.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_passes_immediately() {
        let mut rate = RateState::new(Duration::from_secs(5));
        let started = Instant::now();
        rate.wait("example.com").await;
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn same_host_waits_out_the_interval() {
        let mut rate = RateState::new(Duration::from_millis(200));
        let started = Instant::now();
        rate.wait("example.com").await;
        rate.wait("example.com").await;
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn hosts_are_independent() {
        let mut rate = RateState::new(Duration::from_secs(5));
        let started = Instant::now();
        rate.wait("a.example.com").await;
        rate.wait("b.example.com").await;
        rate.wait("c.example.com").await;
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(rate.tracked_hosts(), 3);
    }
}
