//! Call path matching.
//!
//! # Responsibilities
//! - Accept exactly `/<server>/<method>`
//! - Require both segments to be non-empty ASCII alphanumerics
//! - Build the call identifier `_<server>.HTTP_<method>`
//!
//! # Design Decisions
//! - Matching works on the raw (still percent-encoded) path, so `%2F` or
//!   `%20` never sneak into an identifier
//! - No regex: a byte scan is all the grammar needs

use std::fmt;

use thiserror::Error;

/// The one path pattern the gateway serves.
pub const ROUTE_PATTERN: &str = "/{server}/{method}";

/// Prefix put in front of the server segment.
pub const SERVER_PREFIX: &str = "_";

/// Prefix put in front of the method segment.
pub const METHOD_PREFIX: &str = "HTTP_";

/// Why a path could not be turned into a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("rpc: path {0:?} does not have the form /<server>/<method>")]
    Shape(String),

    #[error("rpc: path segment {0:?} must be non-empty and alphanumeric")]
    Segment(String),
}

/// Split `path` into its server and method segments.
///
/// Counts segments first, the way the handler checks them, then validates each one.
pub fn split_call_path(path: &str) -> Result<(&str, &str), RouteError> {
    let segments: Vec<&str> = path.split('/').collect();
    let [root, server, method] = segments.as_slice() else {
        return Err(RouteError::Shape(path.to_string()));
    };
    if !root.is_empty() {
        return Err(RouteError::Shape(path.to_string()));
    }
    let (server, method) = (*server, *method);
    for segment in [server, method] {
        if !is_segment(segment) {
            return Err(RouteError::Segment(segment.to_string()));
        }
    }
    Ok((server, method))
}

/// Returns true if `path` is exactly `/<alnum+>/<alnum+>`.
pub fn matches(path: &str) -> bool {
    split_call_path(path).is_ok()
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Identifier a request is dispatched under, e.g. `_orders.HTTP_create`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallIdentifier(String);

impl CallIdentifier {
    /// Build the identifier for a server and method pair.
    pub fn new(server: &str, method: &str) -> Self {
        Self(format!("{SERVER_PREFIX}{server}.{METHOD_PREFIX}{method}"))
    }

    /// Build the identifier from a request path.
    pub fn from_path(path: &str) -> Result<Self, RouteError> {
        let (server, method) = split_call_path(path)?;
        Ok(Self::new(server, method))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CallIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_identifier_from_two_segments() {
        let id = CallIdentifier::from_path("/orders/create").unwrap();
        assert_eq!(id.as_str(), "_orders.HTTP_create");
        assert_eq!(
            CallIdentifier::from_path("/Svc9/M0").unwrap().to_string(),
            "_Svc9.HTTP_M0"
        );
    }

    #[test]
    fn rejects_wrong_segment_count() {
        for path in ["/", "/onlyoneSegment", "/a/b/c", "/a/b/", "a/b", ""] {
            assert!(
                matches!(CallIdentifier::from_path(path), Err(RouteError::Shape(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_alphanumeric_segments() {
        for path in ["//b", "/a/", "/a-b/c", "/a/b_c", "/a%20/b", "/caf\u{e9}/b", "/a/b.c"] {
            assert!(
                matches!(CallIdentifier::from_path(path), Err(RouteError::Segment(_))),
                "{path} should be rejected"
            );
            assert!(!matches(path));
        }
    }

    #[test]
    fn matches_valid_paths() {
        assert!(matches("/orders/create"));
        assert!(matches("/A1/b2"));
    }
}
