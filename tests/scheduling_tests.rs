//! A request waiting on a slow result must not hold its worker thread.
//!
//! Runs the scheduler with a single worker so every connection coroutine
//! shares one OS thread.

mod common;

use brrtcrud::pending::{Pending, Settled};
use brrtcrud::record::Record;
use brrtcrud::registry::Registry;
use brrtcrud::resources::{Person, PersonService};
use brrtcrud::service::Service;
use brrtcrud::FailurePolicy;
use common::http;
use common::test_server::{app_service, setup_may_runtime, TestServer};
use std::sync::{Arc, Once};
use std::thread;
use std::time::{Duration, Instant};

static SINGLE_WORKER: Once = Once::new();

fn single_worker_runtime() {
    SINGLE_WORKER.call_once(|| {
        may::config().set_workers(1);
    });
    setup_may_runtime();
}

struct SlowService {
    delay: Duration,
}

impl Service for SlowService {
    type Record = Person;

    fn get(&self, id: &str) -> Pending<Person> {
        let delay = self.delay;
        let person = Person::new("Slow", "Poke").with_id(id.to_string());
        Pending::spawn(move || {
            may::coroutine::sleep(delay);
            Settled::Value(person)
        })
    }
}

#[test]
fn test_fast_request_completes_while_slow_one_waits() {
    single_worker_runtime();
    let mut builder = Registry::builder();
    builder
        .register("persons", PersonService::new())
        .unwrap()
        .register(
            "slow",
            SlowService {
                delay: Duration::from_millis(800),
            },
        )
        .unwrap();
    let server = TestServer::start(app_service(
        Arc::new(builder.build()),
        FailurePolicy::Strict,
        Duration::from_secs(5),
    ));

    let addr = server.addr();
    let slow = thread::spawn(move || {
        let res = http::request(addr, "GET", "/api/slow/1", None);
        (res, Instant::now())
    });
    thread::sleep(Duration::from_millis(150));

    let started = Instant::now();
    let fast = server.request("GET", "/api/persons", None);
    let fast_done = Instant::now();
    assert_eq!(fast.status, 200);
    assert!(
        fast_done - started < Duration::from_millis(400),
        "fast request took {:?} behind a pending one",
        fast_done - started
    );

    let (slow_res, slow_done) = slow.join().unwrap();
    assert_eq!(slow_res.status, 200);
    assert_eq!(slow_res.json()["id"], "1");
    assert!(fast_done < slow_done);
}
