use crate::bootstrap;
use crate::config::{parse_resource_arg, AppConfig, FailurePolicy};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Command-line interface for brrtcrud
#[derive(Parser, Debug)]
#[command(name = "brrtcrud")]
#[command(about = "In-memory REST CRUD server with static file serving", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the server until interrupted
    Serve(ServeArgs),
    /// Print the REST routes of the configured resources
    Routes(RoutesArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Resource to serve as NAME or NAME=SEED_FILE (repeatable)
    #[arg(long = "resource", value_name = "NAME[=PATH]", value_parser = parse_resource_arg)]
    pub resources: Vec<(String, Option<PathBuf>)>,

    /// Directory to serve static files from
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Path prefix of the REST surface
    #[arg(long)]
    pub api_prefix: Option<String>,

    /// Reset every collection to its seeded contents periodically
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub demo: Option<bool>,

    /// Seconds between demo resets
    #[arg(long)]
    pub demo_interval_secs: Option<u64>,

    /// Maximum wait for a service result, in milliseconds
    #[arg(long)]
    pub result_timeout_ms: Option<u64>,

    /// Render internal failures as 404 instead of 500
    #[arg(long, default_value_t = false)]
    pub lenient_errors: bool,
}

impl ServeArgs {
    /// Defaults, then the config file, then these flags.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = load_base(self.config.as_ref())?;
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        apply_resources(&mut config, &self.resources);
        if let Some(dir) = &self.static_dir {
            config.static_dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.api_prefix {
            config.api_prefix = prefix.clone();
        }
        if let Some(demo) = self.demo {
            config.demo.enabled = demo;
        }
        if let Some(secs) = self.demo_interval_secs {
            config.demo.interval_secs = secs;
        }
        if let Some(ms) = self.result_timeout_ms {
            config.result_timeout_ms = ms;
        }
        if self.lenient_errors {
            config.failure_policy = FailurePolicy::Lenient;
        }
        config.normalize()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct RoutesArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Resource name, optionally NAME=SEED_FILE (repeatable)
    #[arg(long = "resource", value_name = "NAME[=PATH]", value_parser = parse_resource_arg)]
    pub resources: Vec<(String, Option<PathBuf>)>,

    /// Path prefix of the REST surface
    #[arg(long)]
    pub api_prefix: Option<String>,
}

impl RoutesArgs {
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = load_base(self.config.as_ref())?;
        apply_resources(&mut config, &self.resources);
        if let Some(prefix) = &self.api_prefix {
            config.api_prefix = prefix.clone();
        }
        config.normalize()?;
        Ok(config)
    }
}

fn load_base(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn apply_resources(config: &mut AppConfig, resources: &[(String, Option<PathBuf>)]) {
    if resources.is_empty() {
        return;
    }
    config.resources = resources.iter().cloned().collect::<BTreeMap<_, _>>();
}

/// Route table lines for every configured resource.
pub fn format_routes(config: &AppConfig) -> Vec<String> {
    const OPERATIONS: [(&str, bool, &str); 5] = [
        ("GET", false, "list"),
        ("GET", true, "get"),
        ("POST", false, "post"),
        ("PUT", true, "put"),
        ("DELETE", true, "delete"),
    ];
    let mut lines = Vec::new();
    for name in config.resources.keys() {
        for (method, with_id, operation) in OPERATIONS {
            let path = if with_id {
                format!("{}{name}/{{id}}", config.api_prefix)
            } else {
                format!("{}{name}", config.api_prefix)
            };
            lines.push(format!("{method:<7} {path:<40} {operation}"));
        }
    }
    lines
}

/// Parse the command line and run the selected command
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the server fails to
/// start, or signal handling cannot be installed.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Serve(args) => {
            let config = args.resolve()?;
            let app = bootstrap::start(&config)?;
            wait_for_shutdown()?;
            info!("Shutdown requested");
            app.stop();
            Ok(())
        }
        Commands::Routes(args) => {
            let config = args.resolve()?;
            for line in format_routes(&config) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use anyhow::Context;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Received signal");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    loop {
        std::thread::park();
    }
}
