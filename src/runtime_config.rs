//! # Runtime Configuration Module
//!
//! Environment knobs for the `may` coroutine runtime that serves requests.
//!
//! ## Environment Variables
//!
//! ### `BRRTCRUD_STACK_SIZE`
//!
//! Stack size for each request coroutine. Accepts decimal (`32768`) or
//! hexadecimal (`0x8000`). Default: `0x8000` (32 KB).
//!
//! Request handling blocks inside the coroutine while a service result
//! settles and serde works on the body, so the default is one step above
//! the smallest usable size.
//!
//! ### `BRRTCRUD_WORKERS`
//!
//! Number of scheduler worker threads. Unset leaves `may`'s default (one per
//! CPU).
//!
//! ## Usage
//!
//! ```rust
//! use brrtcrud::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! config.apply();
//! ```

use std::env;
use tracing::{info, warn};

pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Scheduler worker threads, `None` for the runtime default
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = match lookup("BRRTCRUD_STACK_SIZE") {
            Some(val) => parse_size(&val).unwrap_or_else(|| {
                warn!(value = %val, "Invalid BRRTCRUD_STACK_SIZE, using default");
                DEFAULT_STACK_SIZE
            }),
            None => DEFAULT_STACK_SIZE,
        };
        let workers = lookup("BRRTCRUD_WORKERS")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .filter(|n| *n > 0);
        RuntimeConfig {
            stack_size,
            workers,
        }
    }

    /// Push these settings into the global `may` configuration.
    ///
    /// Must run before the first coroutine is spawned.
    pub fn apply(&self) {
        let config = may::config();
        config.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            config.set_workers(workers);
        }
        info!(
            stack_size = self.stack_size,
            workers = ?self.workers,
            "Coroutine runtime configured"
        );
    }
}

/// Decimal or `0x` hexadecimal byte count.
fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}
