//! # Dispatcher Module
//!
//! Maps an HTTP method plus an API path (already stripped of the API prefix)
//! onto exactly one service operation, or declares the request "not handled".
//!
//! ## Routing
//!
//! The path is split into non-empty, percent-decoded segments. The first
//! segment names the resource and is resolved through the
//! [`Registry`](crate::registry::Registry); the remaining segments and the
//! method select the operation:
//!
//! | Method | Remaining segments | Operation |
//! |--------|--------------------|-----------|
//! | GET    | 0                  | `list()`  |
//! | GET    | 1 (id)             | `get(id)` |
//! | POST   | 0                  | `post(body)` |
//! | PUT    | 1 (id)             | `put(id, body)` |
//! | DELETE | 1 (id)             | `delete(id)` |
//!
//! Any other combination, an empty path and an unknown resource name are
//! all "not handled"; the server answers those with 404.
//!
//! ```rust,ignore
//! use brrtcrud::dispatcher::Dispatcher;
//! use http::Method;
//!
//! let dispatcher = Dispatcher::new(registry);
//! if let Some(route) = dispatcher.route(&Method::GET, "persons/42") {
//!     let pending = dispatcher.dispatch(&route, b"");
//! }
//! ```
//!
//! ## Bodies
//!
//! Dispatching a POST or PUT hands the raw body to the resource handler,
//! which decodes it against the service's data class before the service
//! runs. A decode failure settles as a client error and the service is
//! never called.

mod core;

pub use core::{select_call, split_segments, Dispatcher, RouteMatch, SegmentVec};
