use brrtcrud::dispatcher::Dispatcher;
use brrtcrud::registry::Registry;
use brrtcrud::resources::{Person, PersonService};
use brrtcrud::server::{AppService, HeaderVec, ResponseAdapter};
use brrtcrud::service::Service;
use brrtcrud::FailurePolicy;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn seeded_registry(records: usize) -> Arc<Registry> {
    let service = PersonService::new();
    for i in 0..records {
        let person = Person {
            id: Some(i.to_string()),
            ..Person::new(format!("First{i}"), format!("Last{i}"))
        };
        assert!(service.post(Some(person)).wait(Duration::from_secs(1)).is_value());
    }
    let mut builder = Registry::builder();
    if let Err(e) = builder.register("persons", service) {
        panic!("register persons: {e}");
    }
    Arc::new(builder.build())
}

fn bench_route(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(seeded_registry(0));
    let mut group = c.benchmark_group("route");
    for (method, path) in [
        (Method::GET, "persons"),
        (Method::GET, "persons/42"),
        (Method::PUT, "persons/a%20b"),
        (Method::DELETE, "unknown/1"),
    ] {
        group.bench_with_input(
            BenchmarkId::new(method.as_str(), path),
            &(method.clone(), path),
            |b, (method, path)| b.iter(|| dispatcher.route(black_box(method), black_box(path))),
        );
    }
    group.finish();
}

fn bench_handle(c: &mut Criterion) {
    let mut group = c.benchmark_group("handle");
    for records in [10, 1_000] {
        let service = AppService::new(
            Dispatcher::new(seeded_registry(records)),
            ResponseAdapter::new(FailurePolicy::Strict, Duration::from_secs(1)),
            "/api/",
            None,
        );
        let headers = HeaderVec::new();

        group.bench_with_input(BenchmarkId::new("get", records), &records, |b, _| {
            b.iter(|| service.handle("GET", black_box("/api/persons/5"), &headers, b""))
        });
        group.bench_with_input(BenchmarkId::new("list", records), &records, |b, _| {
            b.iter(|| service.handle("GET", black_box("/api/persons"), &headers, b""))
        });
        group.bench_with_input(BenchmarkId::new("put", records), &records, |b, _| {
            b.iter(|| {
                service.handle(
                    "PUT",
                    black_box("/api/persons/7"),
                    &headers,
                    br#"{"firstName":"Ada","lastName":"Lovelace"}"#,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_route, bench_handle);
criterion_main!(benches);
