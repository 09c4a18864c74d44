//! Tracing subscriber setup shared by the binaries

use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CLI_FILTER: &str = "tripsonality=warn";

/// Human-readable logs on stderr, filtered by `RUST_LOG` (warnings by default)
pub fn init_cli_logging(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("tripsonality=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_CLI_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    debug!("CLI logging initialized");
    Ok(())
}

/// Structured JSON logs in a daily rolling file under `log_dir`.
///
/// stdout carries the MCP transport, so nothing may be written there.
pub fn init_file_logging(log_dir: &Path, file_prefix: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);

    tracing_subscriber::registry()
        .with(
            EnvFilter::new("debug")
                .add_directive("tripsonality=debug".parse()?)
                .add_directive("reqwest=info".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json(),
        )
        .try_init()?;

    info!(
        log_dir = %log_dir.display(),
        file_prefix = file_prefix,
        "File logging initialized"
    );
    Ok(())
}
