#![allow(dead_code)]

pub mod test_server {
    use brrtcrud::config::FailurePolicy;
    use brrtcrud::dispatcher::Dispatcher;
    use brrtcrud::registry::Registry;
    use brrtcrud::resources::PersonService;
    use brrtcrud::server::{AppService, HttpServer, ResponseAdapter, ServerHandle};
    use std::net::{SocketAddr, TcpListener};
    use std::path::PathBuf;
    use std::sync::{Arc, Once};
    use std::time::Duration;

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// Registry with an empty `persons` collection
    pub fn persons_registry() -> Arc<Registry> {
        let mut builder = Registry::builder();
        builder.register("persons", PersonService::new()).unwrap();
        Arc::new(builder.build())
    }

    /// Service over `registry` with static files from `tests/staticdata`
    pub fn app_service(
        registry: Arc<Registry>,
        policy: FailurePolicy,
        timeout: Duration,
    ) -> AppService {
        AppService::new(
            Dispatcher::new(registry),
            ResponseAdapter::new(policy, timeout),
            "/api/",
            Some(PathBuf::from("tests/staticdata")),
        )
    }

    pub fn default_service() -> AppService {
        app_service(persons_registry(), FailurePolicy::Strict, Duration::from_secs(5))
    }

    /// Running server on a random local port, stopped on drop
    pub struct TestServer {
        handle: Option<ServerHandle>,
        addr: SocketAddr,
    }

    impl TestServer {
        pub fn start(service: AppService) -> Self {
            setup_may_runtime();
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let handle = HttpServer(service).start(addr).unwrap();
            handle.wait_ready().unwrap();
            Self {
                handle: Some(handle),
                addr,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        pub fn request(&self, method: &str, path: &str, body: Option<&str>) -> super::http::TestResponse {
            super::http::request(self.addr, method, path, body)
        }

        /// Stop now instead of on drop.
        pub fn stop(mut self, drain_timeout: Duration) {
            if let Some(handle) = self.handle.take() {
                handle.stop(drain_timeout);
            }
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop(Duration::from_secs(1));
            }
        }
    }
}

pub mod http {
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    pub struct TestResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap_or_else(|e| {
                panic!("response body is not JSON ({e}): {}", self.body)
            })
        }

        pub fn error(&self) -> String {
            self.json()["error"].as_str().unwrap_or_default().to_string()
        }
    }

    /// Send one request and read exactly one response (by Content-Length).
    pub fn request(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> TestResponse {
        let mut raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        if let Some(body) = body {
            raw.push_str("Content-Type: application/json\r\n");
            raw.push_str(&format!("Content-Length: {}\r\n", body.len()));
        } else {
            raw.push_str("Content-Length: 0\r\n");
        }
        raw.push_str("\r\n");
        if let Some(body) = body {
            raw.push_str(body);
        }
        send_raw(addr, &raw)
    }

    pub fn send_raw(addr: SocketAddr, raw: &str) -> TestResponse {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        stream.write_all(raw.as_bytes()).unwrap();

        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        loop {
            if let Some(response) = try_parse(&buf) {
                return response;
            }
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        try_parse(&buf).unwrap_or_else(|| {
            panic!("incomplete response: {}", String::from_utf8_lossy(&buf))
        })
    }

    fn try_parse(buf: &[u8]) -> Option<TestResponse> {
        let text = String::from_utf8_lossy(buf);
        let (head, rest) = text.split_once("\r\n\r\n")?;
        let mut lines = head.lines();
        let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| {
                let (k, v) = line.split_once(':')?;
                Some((k.trim().to_string(), v.trim().to_string()))
            })
            .collect();
        let length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        if rest.len() < length {
            return None;
        }
        Some(TestResponse {
            status,
            headers,
            body: rest[..length].to_string(),
        })
    }
}
