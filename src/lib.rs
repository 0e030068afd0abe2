//! # brrtcrud
//!
//! **brrtcrud** is a small coroutine-powered HTTP server that exposes CRUD
//! operations over named in-memory resource collections through one REST
//! convention, and serves static files for every other path.
//!
//! ## Overview
//!
//! | Request | Operation |
//! |---------|-----------|
//! | `GET /api/{resource}` | list all records |
//! | `GET /api/{resource}/{id}` | get one record |
//! | `POST /api/{resource}` | create (or overwrite when the body carries an id) |
//! | `PUT /api/{resource}/{id}` | replace the record at `id` |
//! | `DELETE /api/{resource}/{id}` | remove and return the record at `id` |
//!
//! Any other path is resolved against the static directory.
//!
//! ## Architecture
//!
//! - **[`store`]** - Concurrent keyed record storage
//! - **[`service`]** - The CRUD contract and the in-memory service
//! - **[`registry`]** - Resource name → service mapping
//! - **[`dispatcher`]** - Method + path → service operation
//! - **[`pending`]** - Settle-once results with a bounded wait
//! - **[`server`]** - HTTP front on `may_minihttp` and the Response Adapter
//! - **[`static_files`]** - Static file resolution and the MIME table
//! - **[`bootstrap`]** - Configuration in, running server out
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Front as server::AppService
//!     participant Disp as dispatcher::Dispatcher
//!     participant Reg as registry::Registry
//!     participant Svc as service::Service
//!     participant Adapter as server::ResponseAdapter
//!
//!     Client->>Front: PUT /api/persons/42
//!     Front->>Disp: route(PUT, "persons/42")
//!     Disp->>Reg: get("persons")
//!     Reg-->>Disp: ResourceHandler
//!     Disp-->>Front: RouteMatch { call: Put { id: "42" } }
//!     Front->>Disp: dispatch(route, body)
//!     Disp->>Svc: put("42", decoded body)
//!     Svc-->>Front: Pending<Value>
//!     Front->>Adapter: render(pending, ctx)
//!     Adapter->>Adapter: wait (bounded)
//!     Adapter-->>Client: 200 / 400 / 404 / 405 / 500
//! ```
//!
//! ## Error Model
//!
//! A missing record is not an error: it settles as
//! [`Settled::Absent`](pending::Settled::Absent) and renders as 404. Failures
//! carry an [`ApiError`](error::ApiError) whose [`ErrorKind`](error::ErrorKind)
//! decides the status: client errors 400, unsupported operations 405,
//! internal failures 500 (404 under the lenient policy).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brrtcrud::bootstrap;
//! use brrtcrud::config::AppConfig;
//!
//! let app = bootstrap::start(&AppConfig::default())?;
//! app.wait_ready()?;
//! // ... later
//! app.stop();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bootstrap;
pub mod cli;
pub mod codec;
pub mod config;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod loader;
pub mod logging;
pub mod pending;
pub mod record;
pub mod registry;
pub mod resources;
pub mod runtime_config;
pub mod server;
pub mod service;
pub mod static_files;
pub mod store;

pub use config::{AppConfig, FailurePolicy};
pub use error::{ApiError, ErrorKind};
pub use pending::{Pending, Settled};
pub use record::{DataClass, FieldKind, FieldSpec, Record};
pub use registry::Registry;
pub use service::{MemoryService, Service};
