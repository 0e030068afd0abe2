//! Name → service mapping resolved from the first API path segment.
//!
//! A [`Registry`] is assembled once with a [`RegistryBuilder`] and is
//! immutable afterwards; the server shares it across request coroutines
//! behind an `Arc`.

use crate::error::RegistryError;
use crate::service::{ResourceHandler, Service, ServiceHandler};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable table of resource handlers
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Handler registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Snapshot every registered service.
    pub fn snapshot_all(&self) {
        for handler in self.handlers.values() {
            handler.take_snapshot();
        }
    }

    /// Reset every registered service to its snapshot.
    pub fn reset_all(&self) {
        for handler in self.handlers.values() {
            handler.reset_to_snapshot();
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.names())
            .finish()
    }
}

/// Builder for [`Registry`]
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl RegistryBuilder {
    /// Register a typed service under `name`.
    pub fn register<S: Service>(
        &mut self,
        name: &str,
        service: S,
    ) -> Result<&mut Self, RegistryError> {
        self.register_handler(name, Arc::new(ServiceHandler::new(service)))
    }

    /// Register an already erased handler under `name`.
    ///
    /// Registering the same name twice keeps the last handler.
    pub fn register_handler(
        &mut self,
        name: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<&mut Self, RegistryError> {
        validate_name(name)?;
        let data_class = handler.data_class().name;
        if self.handlers.insert(name.to_string(), handler).is_some() {
            warn!(resource = %name, "Resource registered twice; keeping the last service");
        }
        debug!(resource = %name, data_class, "Registered resource");
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            handlers: self.handlers,
        }
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName {
            name: name.to_string(),
        })
    }
}
