//! # Service Module
//!
//! The contract every resource collection implements, plus the in-memory
//! implementation the server ships with.
//!
//! ## Overview
//!
//! A [`Service`] owns the records of one resource and exposes six operations:
//! `data_class`, `get`, `list`, `post`, `put` and `delete`. Every operation
//! except `data_class` returns a [`Pending`](crate::pending::Pending), and
//! every operation has a default that fails with
//! [`ApiError::Unsupported`](crate::error::ApiError::Unsupported). A service
//! overrides only what it supports:
//!
//! ```rust,ignore
//! use brrtcrud::pending::Pending;
//! use brrtcrud::resources::Person;
//! use brrtcrud::service::Service;
//!
//! struct Directory;
//!
//! impl Service for Directory {
//!     type Record = Person;
//!
//!     fn list(&self) -> Pending<Vec<Person>> {
//!         Pending::value(vec![Person::new("Ada", "Lovelace")])
//!     }
//! }
//! // GET /api/people -> 200, every other method -> 405
//! ```
//!
//! ## Dispatch Seam
//!
//! The registry holds services of different record types side by side, so it
//! stores them behind the object-safe [`ResourceHandler`] trait.
//! [`ServiceHandler`] bridges the two: it decodes request bodies into the
//! service's record type with [`codec`](crate::codec) before calling the
//! typed operation, and encodes the result back into JSON.

mod contract;
mod memory;

pub use contract::{Call, ResourceHandler, Service, ServiceHandler};
pub use memory::MemoryService;
