//! # CLI Module
//!
//! Command-line interface of the `brrtcrud` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the server until SIGINT or SIGTERM:
//!
//! ```bash
//! brrtcrud serve --port 8081 --resource persons=data/persons.json --demo
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML configuration file
//! - `--host <HOST>` / `--port <PORT>` - Bind address
//! - `--resource <NAME[=PATH]>` - Resource to serve, optionally seeded from a JSON array
//!   (repeatable; replaces the configured resources)
//! - `--static-dir <DIR>` - Root for static files
//! - `--api-prefix <PREFIX>` - Path prefix of the REST surface
//! - `--demo[=<BOOL>]` / `--demo-interval-secs <S>` - Periodic reset to seeded data
//! - `--result-timeout-ms <MS>` - Bounded wait for a service result
//! - `--lenient-errors` - Render internal failures as 404 instead of 500
//!
//! ### `routes`
//!
//! Print the REST routes the configured resources expose:
//!
//! ```bash
//! brrtcrud routes --resource persons --resource notes
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{format_routes, run_cli, Cli, Commands, RoutesArgs, ServeArgs};
