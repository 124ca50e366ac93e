use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber: every log line goes to stdout and is
/// appended to `log_file`. The file is created if missing and never rotated.
pub fn init(log_file: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jukebox=debug,warn")),
        )
        .with(
            fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Arc::new(file)),
        )
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))
}
