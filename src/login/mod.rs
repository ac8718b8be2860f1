//! Ready-made session credentials injected into the fetchers.
//!
//! Credential *acquisition* (form login, token exchange) happens outside the
//! crawler; this type only carries the cookies and auth headers the caller
//! already obtained.

use std::collections::HashMap;

/// Cookies and auth headers attached to every fetch.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub cookies: HashMap<String, String>,
    pub auth_headers: HashMap<String, String>,
}

impl Credentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.auth_headers.is_empty()
    }

    /// Render the cookie map as a `Cookie:` header value.
    ///
    /// Returns `None` when there are no cookies, so callers can skip the
    /// header entirely.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let mut pairs: Vec<_> = self.cookies.iter().collect();
        // Deterministic ordering keeps request fingerprints stable.
        pairs.sort_by_key(|(k, _)| k.as_str());
        Some(
            pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
