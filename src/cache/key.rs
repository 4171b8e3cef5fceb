//! Cache Key Builder
//!
//! Derives deterministic cache keys from normalized query parameters.

use std::fmt;
use std::time::Duration;

use url::form_urlencoded::byte_serialize;

/// TTL for headline and search results.
pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60);

/// TTL for the source catalogue.
pub const LONG_TTL: Duration = Duration::from_secs(60 * 60);

// == Param Kind ==
/// How a parameter value is normalized before it enters a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    /// Trimmed, case preserved, percent-encoded
    Text,
    /// Trimmed and lowercased, percent-encoded
    Code,
    /// Canonical integer form
    Number,
}

// == Namespace ==
/// A family of cached upstream queries with its own parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Headlines,
    Search,
    Sources,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Headlines => "headlines",
            Namespace::Search => "search",
            Namespace::Sources => "sources",
        }
    }

    /// TTL applied to documents cached under this namespace.
    pub fn ttl(&self) -> Duration {
        match self {
            Namespace::Headlines | Namespace::Search => SHORT_TTL,
            Namespace::Sources => LONG_TTL,
        }
    }

    /// Parameters that make up a key, in their fixed order.
    fn params(&self) -> &'static [(&'static str, ParamKind)] {
        match self {
            Namespace::Headlines => &[
                ("category", ParamKind::Code),
                ("country", ParamKind::Code),
                ("page", ParamKind::Number),
                ("pageSize", ParamKind::Number),
            ],
            Namespace::Search => &[
                ("q", ParamKind::Text),
                ("language", ParamKind::Code),
                ("sortBy", ParamKind::Text),
                ("page", ParamKind::Number),
                ("pageSize", ParamKind::Number),
            ],
            Namespace::Sources => &[
                ("category", ParamKind::Code),
                ("language", ParamKind::Code),
                ("country", ParamKind::Code),
            ],
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Build Key ==
/// Builds the cache key for a query.
///
/// Parameters are emitted in the namespace's fixed order regardless of the
/// order given; names the namespace does not know are ignored and missing
/// ones are emitted empty. Values are percent-encoded so they can never
/// contain the `&` and `=` separators.
///
/// ```ignore
/// let key = build_key(Namespace::Search, &[("page", "02"), ("q", " Rust ")]);
/// assert_eq!(key, "search:q=Rust&language=&sortBy=&page=2&pageSize=");
/// ```
pub fn build_key(namespace: Namespace, params: &[(&str, &str)]) -> String {
    let mut key = String::with_capacity(64);
    key.push_str(namespace.as_str());
    key.push(':');

    for (i, (name, kind)) in namespace.params().iter().enumerate() {
        if i > 0 {
            key.push('&');
        }
        key.push_str(name);
        key.push('=');

        // Last occurrence wins, matching how query strings are usually read
        if let Some((_, raw)) = params.iter().rev().find(|(n, _)| n == name) {
            key.push_str(&normalize(raw, *kind));
        }
    }

    key
}

fn normalize(raw: &str, kind: ParamKind) -> String {
    let trimmed = raw.trim();
    match kind {
        ParamKind::Text => encode(trimmed),
        ParamKind::Code => encode(&trimmed.to_ascii_lowercase()),
        ParamKind::Number => match trimmed.parse::<i64>() {
            Ok(n) => n.to_string(),
            // Not a number: keep it distinguishable from every canonical integer
            Err(_) => format!("~{}", encode(trimmed)),
        },
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
