//! pagesift: zero-configuration web crawler and structured-data extractor.
//!
//! Point it at seed URLs and it discovers the dominant repeating content
//! pattern on each page, extracts structured records, follows detected
//! pagination, and scales to large multi-domain sessions with politeness,
//! checkpointing, and resume.

pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod login;
pub mod proxy;
pub mod queue;
pub mod robots;
pub mod scale;
pub mod sink;
pub mod utils;

pub use config::{CrawlConfig, CrawlConfigBuilder};
pub use detect::{ContainerCandidate, PaginationHint, PatternSet, ScrollHint, SmartDetector};
pub use engine::{CrawlMode, DualModeEngine, EngineStats, Extraction, PageProbe};
pub use error::{CrawlError, CrawlResult};
pub use export::{CsvExporter, JsonExporter};
pub use extract::{Item, SmartExtractor};
pub use fetch::{BrowserFetcher, HttpFetcher};
pub use login::Credentials;
pub use proxy::{BrowserProxy, ProxyProvider};
pub use queue::{CrawlQueue, QueueSnapshot};
pub use robots::RobotsGate;
pub use scale::checkpoint::Checkpoint;
pub use scale::session::{CrawlControl, CrawlSession, SessionStatus};
pub use scale::{CrawlSummary, ScaleHandler};
pub use sink::{
    CheckpointSink, CollectingSink, LatestProgressSink, MemoryCheckpointSink, NoOpSink,
    ProgressSink, ProgressSnapshot, ResultSink,
};

use std::sync::Arc;

/// Crawl a single seed with default wiring and collect the items.
///
/// Convenience entry point for the common one-liner; anything beyond that
/// should build a [`ScaleHandler`] directly.
///
/// # Errors
///
/// Fails on setup problems only (invalid seed URL); per-page failures are
/// reported in the summary.
pub async fn crawl_collect(
    url: &str,
    mode: CrawlMode,
    max_pages: usize,
) -> CrawlResult<(Vec<Item>, CrawlSummary)> {
    let config = CrawlConfig::default();
    let engine = Arc::new(DualModeEngine::new(
        &config,
        Credentials::default(),
        Arc::new(ProxyProvider::disabled()),
    ));
    let mut handler = ScaleHandler::new(engine, config);
    let sink = CollectingSink::new();
    let summary = handler
        .crawl(&[url.to_string()], mode, Some(max_pages), &sink)
        .await?;
    Ok((sink.items(), summary))
}
