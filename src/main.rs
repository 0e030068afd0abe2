use brrtcrud::cli::run_cli;
use brrtcrud::logging::{init_logging, LogConfig};
use brrtcrud::runtime_config::RuntimeConfig;

fn main() -> anyhow::Result<()> {
    // Held until exit so buffered log lines are flushed
    let _log_guard = init_logging(&LogConfig::from_env())?;
    RuntimeConfig::from_env().apply();
    run_cli()
}
