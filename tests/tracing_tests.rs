//! Log lines emitted while handling a request carry its request id.

mod common;

use brrtcrud::server::HeaderVec;
use common::test_server::default_service;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::Level;

/// In-memory sink for formatted log output
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn message(line: &Value) -> &str {
    line["fields"]["message"].as_str().unwrap_or_default()
}

#[test]
fn test_every_request_log_line_carries_request_id() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(Level::DEBUG)
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(move || writer.clone())
        .finish();

    let service = default_service();
    let request_id = ulid::Ulid::new().to_string();
    let mut headers = HeaderVec::new();
    headers.push(("x-request-id".to_string(), request_id.clone()));

    tracing::subscriber::with_default(subscriber, || {
        // Body id differs from the path id: a client error logged by the adapter
        let res = service.handle(
            "PUT",
            "/api/persons/123",
            &headers,
            br#"{"id":"456","firstName":"X","lastName":"Y"}"#,
        );
        assert_eq!(res.status, 400);
        // Unknown resource: rejected by the dispatcher
        let res = service.handle("GET", "/api/nothing", &headers, b"");
        assert_eq!(res.status, 404);
        let res = service.handle("GET", "/missing.html", &headers, b"");
        assert_eq!(res.status, 404);
    });

    let lines = captured.lines();
    for expected in ["Client error", "Unknown resource", "Request handled"] {
        assert!(
            lines.iter().any(|line| message(line) == expected),
            "no `{expected}` line in {lines:?}"
        );
    }
    for line in &lines {
        assert_eq!(
            line["span"]["request_id"].as_str(),
            Some(request_id.as_str()),
            "line without request id: {line}"
        );
    }
}
