//! Request filter chain.
//!
//! Filters run after the body is read and before the backend is called. They
//! are the hook point for authentication and for routing exceptions.
//!
//! # Evaluation
//! ```text
//! for each filter, in registration order:
//!     Ok(())  → accept, stop scanning
//!     Err(e)  → remember e as the current rejection, keep scanning
//! end: rejected with the last error, or accepted if the chain is empty
//! ```
//!
//! A later accepting filter therefore overrides earlier rejections, while
//! nothing can override an acceptance.

use std::sync::Arc;

use axum::http::{request::Parts, HeaderMap};
use thiserror::Error;

/// A filter's refusal. The message becomes the whole response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FilterRejection(String);

impl FilterRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A request predicate in the filter chain.
///
/// `response` collects headers for the eventual response, whichever path it
/// takes; `request` is the request head.
pub trait HttpFilter: Send + Sync + 'static {
    fn check(
        &self,
        path: &str,
        response: &mut HeaderMap,
        request: &Parts,
    ) -> Result<(), FilterRejection>;
}

impl<F> HttpFilter for F
where
    F: Fn(&str, &mut HeaderMap, &Parts) -> Result<(), FilterRejection> + Send + Sync + 'static,
{
    fn check(
        &self,
        path: &str,
        response: &mut HeaderMap,
        request: &Parts,
    ) -> Result<(), FilterRejection> {
        self(path, response, request)
    }
}

/// Turn a closure into a filter, letting the compiler infer its argument types.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&str, &mut HeaderMap, &Parts) -> Result<(), FilterRejection> + Send + Sync + 'static,
{
    f
}

/// Filters in registration order.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn HttpFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the end of the chain.
    pub fn append(&mut self, filter: impl HttpFilter) {
        self.filters.push(Arc::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain against a request.
    pub fn evaluate(
        &self,
        path: &str,
        response: &mut HeaderMap,
        request: &Parts,
    ) -> Result<(), FilterRejection> {
        let mut outcome = Ok(());
        for filter in &self.filters {
            match filter.check(path, response, request) {
                Ok(()) => return Ok(()),
                Err(rejection) => outcome = Err(rejection),
            }
        }
        outcome
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn parts(path: &str) -> Parts {
        Request::post(path).body(()).unwrap().into_parts().0
    }

    fn reject(message: &'static str) -> impl HttpFilter {
        from_fn(move |_, _, _| Err(FilterRejection::new(message)))
    }

    fn accept() -> impl HttpFilter {
        from_fn(|_, _, _| Ok(()))
    }

    fn run(chain: &FilterChain) -> Result<(), FilterRejection> {
        let request = parts("/orders/create");
        chain.evaluate("/orders/create", &mut HeaderMap::new(), &request)
    }

    #[test]
    fn empty_chain_accepts() {
        assert_eq!(run(&FilterChain::new()), Ok(()));
    }

    #[test]
    fn all_rejecting_returns_last_error() {
        let mut chain = FilterChain::new();
        chain.append(reject("first"));
        chain.append(reject("second"));
        assert_eq!(run(&chain), Err(FilterRejection::new("second")));
    }

    #[test]
    fn later_accept_overrides_earlier_rejection() {
        let mut chain = FilterChain::new();
        chain.append(reject("denied"));
        chain.append(accept());
        assert_eq!(run(&chain), Ok(()));
    }

    #[test]
    fn accept_stops_the_scan() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let mut chain = FilterChain::new();
        chain.append(accept());
        chain.append(from_fn(move |_, _, _| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(FilterRejection::new("never"))
        }));

        assert_eq!(run(&chain), Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn filters_see_path_and_write_headers() {
        let mut chain = FilterChain::new();
        chain.append(from_fn(|path, response, request| {
            response.insert("x-filtered", HeaderValue::from_static("yes"));
            if path == "/admin/drop" && request.headers.get("authorization").is_none() {
                return Err(FilterRejection::new("forbidden"));
            }
            Ok(())
        }));

        let mut headers = HeaderMap::new();
        let request = parts("/admin/drop");
        assert_eq!(
            chain.evaluate("/admin/drop", &mut headers, &request),
            Err(FilterRejection::new("forbidden"))
        );
        assert_eq!(headers["x-filtered"], "yes");
        assert_eq!(chain.len(), 1);
    }
}
