//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (CORS, request ID, route table)
//!     → matcher.rs (validate /<server>/<method>)
//!     → gateway handler, or 400 when the path does not match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exactly one pattern; everything else is rejected
//! - Deterministic: same path always yields the same identifier

pub mod matcher;
pub mod router;

pub use matcher::{CallIdentifier, RouteError, ROUTE_PATTERN};
pub use router::build_router;
