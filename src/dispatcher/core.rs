use crate::pending::Pending;
use crate::registry::Registry;
use crate::service::{Call, ResourceHandler};
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Path segments, inline for the common `resource/id` shape
pub type SegmentVec = SmallVec<[String; 4]>;

/// Split `path` into non-empty segments, percent-decoding each one.
///
/// Segments that are not valid UTF-8 after decoding are kept verbatim.
pub fn split_segments(path: &str) -> SegmentVec {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            urlencoding::decode(s)
                .unwrap_or(Cow::Borrowed(s))
                .into_owned()
        })
        .collect()
}

/// Operation selected by `method` and the segments after the resource name.
pub fn select_call(method: &Method, rest: &[String]) -> Option<Call> {
    match rest {
        [] if *method == Method::GET => Some(Call::List),
        [] if *method == Method::POST => Some(Call::Post),
        [id] if *method == Method::GET => Some(Call::Get { id: id.clone() }),
        [id] if *method == Method::PUT => Some(Call::Put { id: id.clone() }),
        [id] if *method == Method::DELETE => Some(Call::Delete { id: id.clone() }),
        _ => None,
    }
}

/// A request resolved to one service operation
#[derive(Clone)]
pub struct RouteMatch {
    /// Registered resource name (first path segment)
    pub resource: String,
    pub call: Call,
    /// Matched API path without the prefix, segments joined by `/`
    pub path: String,
    pub handler: Arc<dyn ResourceHandler>,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("resource", &self.resource)
            .field("call", &self.call)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Routes API requests to registered services
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve `method` + `api_path`, or `None` when the request is not handled.
    pub fn route(&self, method: &Method, api_path: &str) -> Option<RouteMatch> {
        let segments = split_segments(api_path);
        let (resource, rest) = segments.split_first()?;
        let Some(handler) = self.registry.get(resource) else {
            debug!(resource = %resource, "Unknown resource");
            return None;
        };
        let Some(call) = select_call(method, rest) else {
            debug!(resource = %resource, method = %method, segments = rest.len(), "No operation for method and path");
            return None;
        };
        Some(RouteMatch {
            resource: resource.clone(),
            call,
            path: segments.join("/"),
            handler: Arc::clone(handler),
        })
    }

    /// Invoke the matched operation. The returned result may not be settled yet.
    pub fn dispatch(&self, route: &RouteMatch, body: &[u8]) -> Pending<Value> {
        debug!(resource = %route.resource, call = %route.call, body_len = body.len(), "Dispatching");
        route.handler.invoke(&route.call, body)
    }
}
