//! Dual fetch backends: lightweight HTTP and full browser rendering.
//!
//! Both expose the same capability, `fetch(url) -> Option<html>`; the
//! dual-mode engine decides which one runs.

pub mod browser;
pub mod http;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
