//! # Server Module
//!
//! The HTTP front: `may_minihttp` accepts connections and calls
//! [`AppService`] once per request, on its own coroutine.
//!
//! - [`request`] copies method, path, headers and body out of the raw request
//! - [`AppService::handle`] routes API paths through the dispatcher and
//!   serves static files for everything else
//! - [`response`] holds the Response Adapter, the single place a service
//!   outcome becomes a status code
//! - [`http_server`] starts the listener and implements graceful stop
//!
//! Every response carries `Cache-Control: no-cache`. Errors are always
//! `{"error": "<message>"}`.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, HeaderVec, ParsedRequest};
pub use response::{status_reason, ApiResponse, RenderContext, ResponseAdapter};
pub use service::{AppService, ServerState, SHUTTING_DOWN};
