use may_minihttp::Request;
use smallvec::SmallVec;
use std::io::Read;
use tracing::{debug, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Request headers as `(lower-case name, value)` pairs
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Value of header `name` (case-insensitive).
pub fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Path part of a request target.
pub fn strip_query(raw_path: &str) -> &str {
    raw_path.split(['?', '#']).next().unwrap_or("/")
}

/// Extract method, path, headers and body from a `may_minihttp::Request`.
///
/// Headers are copied before the body is read, since reading the body
/// consumes the request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let path = strip_query(req.path()).to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(method = %method, path = %path, error = %e, "Failed to read request body");
        body.clear();
    }

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        body_len = body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/api/persons?x=1"), "/api/persons");
        assert_eq!(strip_query("/index.html#top"), "/index.html");
        assert_eq!(strip_query("/plain"), "/plain");
    }

    #[test]
    fn test_find_header_case_insensitive() {
        let mut headers = HeaderVec::new();
        headers.push(("x-request-id".to_string(), "abc".to_string()));
        assert_eq!(find_header(&headers, "X-Request-Id"), Some("abc"));
        assert_eq!(find_header(&headers, "content-type"), None);
    }
}
