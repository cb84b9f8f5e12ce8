//! Host name keys
//!
//! A `HostNameKey` is the canonical form of a host name as it is used for
//! lookups in the registry. Canonicalization trims surrounding whitespace,
//! drops any path suffix (`/...`), drops a trailing `:port` and lower-cases
//! what is left. Bracketed IPv6 literals keep their brackets; unbracketed ones
//! are kept whole since their last group cannot be told apart from a port.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HostNameKey(String);

impl HostNameKey {
    /// Canonicalize `raw`. Returns `None` when nothing is left after
    /// normalization.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let host = match trimmed.find('/') {
            Some(idx) => &trimmed[..idx],
            None => trimmed,
        };

        let host = if host.starts_with('[') {
            match host.find(']') {
                Some(end) => &host[..=end],
                None => host,
            }
        } else if host.matches(':').count() > 1 {
            // bare IPv6 literal, no port to strip
            host
        } else {
            match host.rsplit_once(':') {
                Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
                _ => host,
            }
        };

        let canonical = host.trim().to_lowercase();
        if canonical.is_empty() {
            None
        } else {
            Some(Self(canonical))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostNameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
