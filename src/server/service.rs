use super::request::{find_header, parse_request, HeaderVec, ParsedRequest};
use super::response::{ApiResponse, RenderContext, ResponseAdapter};
use crate::dispatcher::Dispatcher;
use crate::ids::RequestId;
use crate::static_files::StaticFiles;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Span};

/// Message sent with 503 while the server drains
pub const SHUTTING_DOWN: &str = "Server is shutting down";

/// Drain bookkeeping shared by every clone of an [`AppService`] and its server handle
#[derive(Debug, Default)]
pub struct ServerState {
    in_flight: AtomicUsize,
    draining: AtomicBool,
}

impl ServerState {
    /// Requests currently inside [`AppService::handle`].
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Refuse new requests from now on.
    pub fn begin_drain(&self) {
        self.draining.store(true, Ordering::SeqCst);
    }
}

/// Counts one request as in flight until dropped
struct InFlightGuard<'a>(&'a ServerState);

impl<'a> InFlightGuard<'a> {
    fn enter(state: &'a ServerState) -> Self {
        state.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Per-request entry point: API dispatch under the prefix, static files elsewhere
#[derive(Clone)]
pub struct AppService {
    dispatcher: Dispatcher,
    adapter: ResponseAdapter,
    api_prefix: Arc<str>,
    static_files: Option<StaticFiles>,
    state: Arc<ServerState>,
}

impl AppService {
    /// `api_prefix` is expected in canonical form (`/api/`).
    pub fn new(
        dispatcher: Dispatcher,
        adapter: ResponseAdapter,
        api_prefix: &str,
        static_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            dispatcher,
            adapter,
            api_prefix: Arc::from(api_prefix),
            static_files: static_dir.map(StaticFiles::new),
            state: Arc::new(ServerState::default()),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// API path for `path`, or `None` when `path` is outside the API prefix.
    ///
    /// The prefix without its trailing slash (`/api`) is an empty API path.
    pub fn api_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        if let Some(rest) = path.strip_prefix(&*self.api_prefix) {
            return Some(rest);
        }
        let bare = self.api_prefix.trim_end_matches('/');
        (path == bare).then_some("")
    }

    /// Handle one request and produce its response.
    ///
    /// Everything logged while handling, down to the dispatcher and the
    /// response adapter, happens inside a `request` span carrying the request
    /// id, method and path. The span is entered around synchronous sections
    /// only: waiting for a result can move the coroutine to another thread.
    pub fn handle(&self, method: &str, path: &str, headers: &HeaderVec, body: &[u8]) -> ApiResponse {
        let _guard = InFlightGuard::enter(&self.state);
        let started = Instant::now();
        let request_id = RequestId::from_header_or_new(find_header(headers, "x-request-id"));
        let span = info_span!("request", request_id = %request_id, method, path);

        let response = if self.state.is_draining() {
            span.in_scope(|| debug!("Rejected while draining"));
            ApiResponse::error(503, SHUTTING_DOWN)
        } else {
            match self.api_path(path) {
                Some(api_path) => self.handle_api(&span, method, path, api_path, body),
                None => span.in_scope(|| self.handle_static(path)),
            }
        };

        span.in_scope(|| {
            info!(
                status = response.status,
                latency_ms = started.elapsed().as_millis() as u64,
                "Request handled"
            )
        });
        response
    }

    fn handle_api(
        &self,
        span: &Span,
        method: &str,
        path: &str,
        api_path: &str,
        body: &[u8],
    ) -> ApiResponse {
        let dispatched = span.in_scope(|| {
            let route = Method::from_bytes(method.as_bytes())
                .ok()
                .and_then(|m| self.dispatcher.route(&m, api_path).map(|r| (m, r)));
            let Some((method, route)) = route else {
                debug!("Not handled");
                return Err(ApiResponse::error(404, format!("Not found: {path}")));
            };
            debug!(
                resource = %route.resource,
                call = %route.call,
                "Request dispatched"
            );
            let pending = self.dispatcher.dispatch(&route, body);
            Ok((method, route, pending))
        });
        let (method, route, pending) = match dispatched {
            Ok(dispatched) => dispatched,
            Err(response) => return response,
        };

        let outcome = pending.wait(self.adapter.timeout());
        span.in_scope(|| {
            self.adapter.render_settled(
                outcome,
                RenderContext {
                    method: &method,
                    path: &route.path,
                    id: route.call.id(),
                },
            )
        })
    }

    fn handle_static(&self, path: &str) -> ApiResponse {
        let Some(static_files) = &self.static_files else {
            return ApiResponse::error(404, format!("File not found: {}", StaticFiles::normalize(path)));
        };
        match static_files.load(path) {
            Ok(file) => ApiResponse::new(200, file.mime.header, file.bytes),
            Err(e) => {
                if e.status() == 500 {
                    warn!(error = %e, "Static file read failed");
                } else {
                    debug!(error = %e, "Static file not served");
                }
                ApiResponse::error(e.status(), e.to_string())
            }
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            body,
        } = parse_request(req);
        self.handle(&method, &path, &headers, &body).write_to(res);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::resources::PersonService;
    use std::time::Duration;

    fn service() -> AppService {
        let mut builder = Registry::builder();
        builder.register("persons", PersonService::new()).unwrap();
        let dispatcher = Dispatcher::new(Arc::new(builder.build()));
        AppService::new(
            dispatcher,
            ResponseAdapter::new(Default::default(), Duration::from_secs(1)),
            "/api/",
            Some(PathBuf::from("tests/staticdata")),
        )
    }

    #[test]
    fn test_api_path() {
        let s = service();
        assert_eq!(s.api_path("/api/persons"), Some("persons"));
        assert_eq!(s.api_path("/api/"), Some(""));
        assert_eq!(s.api_path("/api"), Some(""));
        assert_eq!(s.api_path("/apix"), None);
        assert_eq!(s.api_path("/index.html"), None);
    }

    #[test]
    fn test_unrouted_api_path_is_not_found() {
        let s = service();
        let res = s.handle("GET", "/api/", &HeaderVec::new(), b"");
        assert_eq!(res.status, 404);
        assert_eq!(res.error_message().as_deref(), Some("Not found: /api/"));
    }

    #[test]
    fn test_draining_rejects() {
        let s = service();
        s.state().begin_drain();
        let res = s.handle("GET", "/api/persons", &HeaderVec::new(), b"");
        assert_eq!(res.status, 503);
        assert_eq!(res.error_message().as_deref(), Some(SHUTTING_DOWN));
        assert_eq!(s.state().in_flight(), 0);
    }

    #[test]
    fn test_in_flight_returns_to_zero() {
        let s = service();
        let clone = s.clone();
        let _ = clone.handle("GET", "/api/persons", &HeaderVec::new(), b"");
        assert_eq!(s.state().in_flight(), 0);
    }
}
