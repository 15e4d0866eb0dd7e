//! Client identifier derived from proxy headers.

use std::fmt;

/// Sentinel used when no usable header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Longest identifier kept; covers every textual IPv6 form.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Headers consulted, in priority order.
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort client identifier, safe to embed in a storage key.
///
/// Only `[a-zA-Z0-9.:_-]` can appear in the value; it is impossible to build
/// one without going through [`ClientIdentifier::sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentifier(String);

impl ClientIdentifier {
    /// Sanitize a raw value, replacing every disallowed character with `_`
    /// and truncating to [`MAX_IDENTIFIER_LEN`] characters.
    pub fn sanitize(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::unknown();
        }

        let cleaned = raw
            .chars()
            .take(MAX_IDENTIFIER_LEN)
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Self(cleaned)
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    /// Derive the identifier from request headers.
    ///
    /// `lookup` returns the value of a header by lowercase name. The edge
    /// proxy header wins over `x-real-ip`, which wins over the first entry
    /// of `x-forwarded-for`.
    pub fn from_headers<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let non_blank = |name: &str| lookup(name).map(str::trim).filter(|v| !v.is_empty());

        let ip = non_blank(CF_CONNECTING_IP)
            .or_else(|| non_blank(X_REAL_IP))
            .or_else(|| {
                non_blank(X_FORWARDED_FOR)
                    .and_then(|list| list.split(',').next())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            });

        match ip {
            Some(ip) => Self::sanitize(ip),
            None => Self::unknown(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CLIENT
    }
}

impl fmt::Display for ClientIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClientIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
