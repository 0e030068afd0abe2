//! # Application Configuration
//!
//! [`AppConfig`] holds everything the bootstrap needs to build the registry
//! and start the server. Values are layered, lowest precedence first:
//!
//! 1. [`AppConfig::default()`]
//! 2. an optional YAML file ([`AppConfig::load`]); every key is optional
//! 3. command-line flags (see [`crate::cli`])
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8081
//! api_prefix: /api/
//! static_dir: public
//! result_timeout_ms: 30000
//! failure_policy: strict
//! demo:
//!   enabled: true
//!   interval_secs: 300
//! resources:
//!   persons: data/persons.json
//!   notes: ~
//! ```
//!
//! A resource with no seed path starts empty.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How internal failures are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Internal failures are 500
    #[default]
    Strict,
    /// Internal failures are 404
    Lenient,
}

impl FailurePolicy {
    /// Status code used for an internal failure under this policy.
    #[must_use]
    pub fn internal_failure_status(self) -> u16 {
        match self {
            FailurePolicy::Strict => 500,
            FailurePolicy::Lenient => 404,
        }
    }
}

/// Periodic reset of every collection to its post-seed contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Path prefix of the REST surface; always starts and ends with `/`
    pub api_prefix: String,
    /// Root of static files; `None` disables static serving
    pub static_dir: Option<PathBuf>,
    /// Bounded wait for a service result
    pub result_timeout_ms: u64,
    /// How long `stop` waits for in-flight requests
    pub drain_timeout_ms: u64,
    pub failure_policy: FailurePolicy,
    pub demo: DemoConfig,
    /// Resource name -> optional seed file
    pub resources: BTreeMap<String, Option<PathBuf>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(
            crate::resources::PERSONS.to_string(),
            Some(PathBuf::from("data/persons.json")),
        );
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            api_prefix: "/api/".to_string(),
            static_dir: Some(PathBuf::from("public")),
            result_timeout_ms: 30_000,
            drain_timeout_ms: 5_000,
            failure_policy: FailurePolicy::Strict,
            demo: DemoConfig::default(),
            resources,
        }
    }
}

impl AppConfig {
    /// Load a YAML config file on top of the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: AppConfig = serde_yaml::from_str(text)?;
        config.normalize()?;
        Ok(config)
    }

    /// Canonicalise the API prefix and reject unusable values.
    pub fn normalize(&mut self) -> Result<()> {
        let trimmed = self.api_prefix.trim_matches('/');
        if trimmed.is_empty() {
            bail!("api_prefix must name at least one path segment");
        }
        self.api_prefix = format!("/{trimmed}/");
        if self.result_timeout_ms == 0 {
            bail!("result_timeout_ms must be greater than zero");
        }
        if self.demo.enabled && self.demo.interval_secs == 0 {
            bail!("demo.interval_secs must be greater than zero");
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn result_timeout(&self) -> Duration {
        Duration::from_millis(self.result_timeout_ms)
    }

    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    #[must_use]
    pub fn demo_interval(&self) -> Duration {
        Duration::from_secs(self.demo.interval_secs)
    }
}

/// Parse a `NAME=PATH` (or bare `NAME`) resource mapping.
pub fn parse_resource_arg(arg: &str) -> Result<(String, Option<PathBuf>), String> {
    let (name, path) = match arg.split_once('=') {
        Some((name, path)) => (name.trim(), Some(path.trim())),
        None => (arg.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("missing resource name in '{arg}'"));
    }
    let path = path.filter(|p| !p.is_empty()).map(PathBuf::from);
    Ok((name.to_string(), path))
}
