//! URL manipulation utilities.
//!
//! This module provides the URL-level primitives the crawler is built on:
//! relative resolution, host extraction, extension filtering, and same-domain
//! checks.

use url::Url;

/// Resolve `href` against `base`, returning the absolute URL.
///
/// Returns `None` when either side is unparseable. Fragments and
/// scheme-relative forms are handled by the `url` crate's join semantics.
#[must_use]
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    Some(joined.into())
}

/// Extract the domain key for a URL: the lowercased network location.
///
/// The key includes an explicit port when one is present, so two services on
/// the same address are tracked as distinct hosts. URLs without a host
/// (already a bare path) fall back to the path itself, and unparseable input
/// is returned unchanged so callers always get a usable map key.
#[must_use]
pub fn domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                match parsed.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host,
                }
            }
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Check whether a URL passes the banned-extension filter.
///
/// The match is a case-insensitive suffix test; query strings are not
/// stripped first, mirroring how listing sites link plain asset files.
#[must_use]
pub fn is_allowed_extension(url: &str, banned: &[String]) -> bool {
    let lower = url.to_ascii_lowercase();
    !banned
        .iter()
        .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
}

/// Whether two URLs share the same domain key.
#[must_use]
pub fn same_domain(a: &str, b: &str) -> bool {
    domain(a) == domain(b)
}

/// Origin (`scheme://netloc`) of a URL, used as the robots.txt cache key.
#[must_use]
pub fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let origin = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    Some(origin)
}
