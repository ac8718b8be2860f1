//! Configuration module for crawl sessions
//!
//! Provides `CrawlConfig` with a fluent builder and read-only accessors.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::CrawlConfigBuilder;
pub use types::CrawlConfig;
