use crate::codec;
use crate::config::FailurePolicy;
use crate::error::{ApiError, ErrorKind};
use crate::pending::{Pending, Settled};
use crate::static_files;
use http::Method;
use may_minihttp::Response;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::time::Duration;
use tracing::{error, warn};

pub const CACHE_CONTROL: &str = "Cache-Control: no-cache";
const JSON_CONTENT_TYPE: &str = "Content-Type: application/json";

/// Header lines of a response, inline for the usual two or three
pub type HeaderLines = SmallVec<[&'static str; 4]>;

pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Content-Type line for JSON bodies, as registered in the static MIME table.
fn json_content_type() -> &'static str {
    static_files::mime_for_extension("json").map_or(JSON_CONTENT_TYPE, |m| m.header)
}

/// Wire-level response produced by [`AppService::handle`](super::AppService::handle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Complete header lines (`Name: value`); `Cache-Control: no-cache` is always present
    pub headers: HeaderLines,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        let mut headers = HeaderLines::new();
        headers.push(content_type);
        headers.push(CACHE_CONTROL);
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, json_content_type(), codec::to_bytes(value))
    }

    /// `{"error": message}` with `status`.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::json(status, &json!({ "error": message }))
    }

    /// Value of header `name` (case-insensitive), if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    /// Body parsed as JSON.
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The `error` message of an error body.
    pub fn error_message(&self) -> Option<String> {
        self.json_body()?
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub fn write_to(self, res: &mut Response) {
        res.status_code(self.status as usize, status_reason(self.status));
        for line in self.headers {
            res.header(line);
        }
        res.body_vec(self.body);
    }
}

/// What the adapter needs to know about the request it renders
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub method: &'a Method,
    /// API path after the prefix
    pub path: &'a str,
    /// Path id, used in "not found" messages
    pub id: Option<&'a str>,
}

/// Turns service outcomes into [`ApiResponse`]s
///
/// This is the only place an [`ErrorKind`] becomes a status code. The
/// request path waits for results with the adapter's timeout.
#[derive(Debug, Clone, Copy)]
pub struct ResponseAdapter {
    policy: FailurePolicy,
    timeout: Duration,
}

impl ResponseAdapter {
    pub fn new(policy: FailurePolicy, timeout: Duration) -> Self {
        Self { policy, timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Wait (bounded) for `pending` and render the outcome.
    pub fn render(&self, pending: Pending<Value>, ctx: RenderContext<'_>) -> ApiResponse {
        self.render_settled(pending.wait(self.timeout), ctx)
    }

    pub fn render_settled(&self, outcome: Settled<Value>, ctx: RenderContext<'_>) -> ApiResponse {
        match outcome {
            Settled::Value(value) => ApiResponse::json(200, &value),
            Settled::Absent => ApiResponse::error(404, not_found_message(ctx.id)),
            Settled::Failed(err) => self.render_error(&err, ctx),
        }
    }

    fn render_error(&self, err: &ApiError, ctx: RenderContext<'_>) -> ApiResponse {
        match err.kind() {
            ErrorKind::ClientError => {
                warn!(method = %ctx.method, path = %ctx.path, error = %err, "Client error");
                ApiResponse::error(400, err.to_string())
            }
            ErrorKind::UnsupportedOperation => {
                warn!(method = %ctx.method, path = %ctx.path, "Operation not supported");
                ApiResponse::error(405, format!("Method Not Allowed: {}:{}", ctx.method, ctx.path))
            }
            ErrorKind::InternalFailure => {
                let status = self.policy.internal_failure_status();
                if let ApiError::TimedOut(waited) = err {
                    error!(
                        method = %ctx.method,
                        path = %ctx.path,
                        waited_ms = waited.as_millis() as u64,
                        "Service result timed out"
                    );
                } else {
                    error!(method = %ctx.method, path = %ctx.path, error = %err, status, "Service failure");
                }
                ApiResponse::error(status, err.to_string())
            }
        }
    }
}

impl Default for ResponseAdapter {
    fn default() -> Self {
        Self::new(FailurePolicy::Strict, Duration::from_secs(30))
    }
}

fn not_found_message(id: Option<&str>) -> String {
    match id {
        Some(id) => format!("Not found: {id}"),
        None => "Not found".to_string(),
    }
}
