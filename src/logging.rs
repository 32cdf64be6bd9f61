use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Route `tracing` output to a log file; stdout belongs to the terminal UI.
///
/// `RUST_LOG` wins over the default filter. Keep the returned guard alive for
/// the life of the program or buffered lines are lost.
pub fn init(log_path: &Path, verbose: bool) -> Result<WorkerGuard> {
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let file = opts
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (writer, guard) = non_blocking(file);

    let default_filter = if verbose {
        "gallery_feed=debug"
    } else {
        "gallery_feed=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(guard)
}
