//! # Path Resolution
//!
//! Turns whatever the host reports as its location into a normalized
//! [`NavigationState`]. Pure functions only, no I/O.
//!
//! Besides plain normalization this understands the static-hosting redirect
//! trick: a host that can only serve `index.html` answers unknown deep paths
//! by redirecting to `/?/<path>&<query...>`, and we decode that back into a
//! virtual path here.
//!
//! ```text
//! /?/govern/audit-detail&decision=GV-1
//!        │
//!        ▼
//! { path: "/govern/audit-detail", search: "?decision=GV-1" }
//! ```

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::Serialize;

use crate::platform::Location;

/// Prefix that marks a legacy redirect payload in the search string.
pub const LEGACY_REDIRECT_PREFIX: &str = "?/";

/// Stand-in for `&` inside a legacy redirect segment. Must stay byte-for-byte
/// stable, previously shared links depend on it.
pub const LEGACY_AMPERSAND: &str = "~and~";

/// Characters escaped when building a legacy redirect segment.
const SEGMENT_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Current navigation state. `path` is always normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub path: String,
    pub search: String,
}

impl NavigationState {
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            search: String::new(),
        }
    }

    /// Path and search joined back into a URL.
    pub fn href(&self) -> String {
        format!("{}{}", self.path, self.search)
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::root()
    }
}

/// Normalizes a pathname: empty becomes `/`, trailing slashes are dropped
/// (except for the root itself) and a missing leading `/` is added.
pub fn normalize(pathname: &str) -> String {
    if pathname.is_empty() {
        return "/".to_string();
    }
    let trimmed = if pathname.len() > 1 {
        pathname.trim_end_matches('/')
    } else {
        pathname
    };
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Resolves a host location into navigation state.
pub fn resolve(location: &Location) -> NavigationState {
    let path = normalize(&location.pathname);
    if path != "/" {
        return NavigationState {
            path,
            search: location.search.clone(),
        };
    }

    match location.search.strip_prefix(LEGACY_REDIRECT_PREFIX) {
        Some(payload) => decode_legacy_redirect(payload),
        None => NavigationState {
            path,
            search: location.search.clone(),
        },
    }
}

/// Decodes the payload that follows `?/` in a legacy redirect.
fn decode_legacy_redirect(payload: &str) -> NavigationState {
    if payload.is_empty() {
        return NavigationState::root();
    }

    let mut segments = payload.split('&').map(decode_segment);
    let raw_path = segments.next().unwrap_or_default();
    let params: Vec<String> = segments.collect();

    let path = normalize(&format!("/{}", raw_path.trim_start_matches('/')));
    let search = if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    };
    NavigationState { path, search }
}

/// Percent-decodes, then replaces `~and~` with `&`. A malformed escape leaves
/// the segment with only the `~and~` substitution applied.
fn decode_segment(segment: &str) -> String {
    strict_percent_decode(segment)
        .map(|decoded| decoded.replace(LEGACY_AMPERSAND, "&"))
        .unwrap_or_else(|| segment.replace(LEGACY_AMPERSAND, "&"))
}

/// Percent-decodes `input`, rejecting what a browser's `decodeURIComponent`
/// rejects: a `%` not followed by two hex digits, or bytes that are not UTF-8.
fn strict_percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    percent_decode_str(input)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Builds the legacy redirect URL a static host would send for `path` and
/// `search`. Inverse of [`resolve`] for every normalized path.
pub fn encode_legacy_redirect(path: &str, search: &str) -> String {
    let path = normalize(path);
    let mut encoded = format!(
        "/{}{}",
        LEGACY_REDIRECT_PREFIX,
        encode_segment(path.trim_start_matches('/'))
    );
    let query = search.strip_prefix('?').unwrap_or(search);
    for param in query.split('&').filter(|param| !param.is_empty()) {
        encoded.push('&');
        encoded.push_str(&encode_segment(param));
    }
    encoded
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ESCAPES)
        .to_string()
        .replace('&', LEGACY_AMPERSAND)
}
