//! Process bootstrap: configuration in, running server out.

use crate::config::AppConfig;
use crate::demo::DemoMode;
use crate::dispatcher::Dispatcher;
use crate::loader;
use crate::record::Record;
use crate::registry::{Registry, RegistryBuilder};
use crate::resources::{Document, Person, PERSONS};
use crate::server::{AppService, HttpServer, ResponseAdapter, ServerHandle};
use crate::service::MemoryService;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the registry for every configured resource, seeding where a file is given.
///
/// `persons` is a [`Person`] collection; every other name holds [`Document`]s.
/// A seed file that cannot be loaded is logged and the collection starts empty.
pub fn build_registry(config: &AppConfig) -> Result<Registry> {
    let mut builder = Registry::builder();
    for (name, seed) in &config.resources {
        if name == PERSONS {
            register_seeded::<Person>(&mut builder, name, seed.as_deref())?;
        } else {
            register_seeded::<Document>(&mut builder, name, seed.as_deref())?;
        }
    }
    let registry = builder.build();
    info!(resources = ?registry.names(), "Registry built");
    Ok(registry)
}

fn register_seeded<R: Record>(
    builder: &mut RegistryBuilder,
    name: &str,
    seed: Option<&Path>,
) -> Result<()> {
    let service = MemoryService::<R>::new();
    if let Some(path) = seed {
        match loader::seed(&service, path) {
            Ok(count) => info!(resource = %name, path = %path.display(), records = count, "Seeded resource"),
            Err(e) => warn!(resource = %name, error = %format!("{e:#}"), "Seeding failed; starting empty"),
        }
    }
    builder
        .register(name, service)
        .with_context(|| format!("Failed to register resource '{name}'"))?;
    Ok(())
}

/// Request handler for `config` over `registry`.
pub fn build_service(config: &AppConfig, registry: Arc<Registry>) -> AppService {
    AppService::new(
        Dispatcher::new(registry),
        ResponseAdapter::new(config.failure_policy, config.result_timeout()),
        &config.api_prefix,
        config.static_dir.clone(),
    )
}

/// A started server plus its background tasks
pub struct RunningApp {
    handle: ServerHandle,
    demo: Option<DemoMode>,
    registry: Arc<Registry>,
    drain_timeout: Duration,
}

impl RunningApp {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.handle.addr()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Block until the listener accepts connections.
    pub fn wait_ready(&self) -> std::io::Result<()> {
        self.handle.wait_ready()
    }

    /// Stop demo mode, drain in-flight requests and release the socket.
    pub fn stop(self) {
        if let Some(demo) = self.demo {
            demo.stop();
        }
        self.handle.stop(self.drain_timeout);
    }
}

/// Build everything from `config` and start serving.
pub fn start(config: &AppConfig) -> Result<RunningApp> {
    let registry = Arc::new(build_registry(config)?);
    let service = build_service(config, Arc::clone(&registry));
    let handle = HttpServer(service)
        .start(config.bind_addr())
        .with_context(|| format!("Failed to start server on {}", config.bind_addr()))?;

    let demo = if config.demo.enabled {
        Some(DemoMode::start(Arc::clone(&registry), config.demo_interval())?)
    } else {
        None
    };

    info!(
        url = %format!("http://localhost:{}", handle.addr().port()),
        api_prefix = %config.api_prefix,
        "Server started"
    );
    Ok(RunningApp {
        handle,
        demo,
        registry,
        drain_timeout: config.drain_timeout(),
    })
}
