//! Logging initialization: plain-text lines (local timestamp, level, target, fields) teed to
//! stdout and a log file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::{FmtSpan, Writer},
    fmt::time::FormatTime,
    fmt::writer::MakeWriterExt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Local time in `YYYY-MM-DD HH:MM:SS`.
struct ChronoLocal;

impl FormatTime for ChronoLocal {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Opens `log_file_path` for appending, creating missing parent directories.
fn open_log_file(log_file_path: &str) -> io::Result<fs::File> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
}

/// Initializes the global tracing subscriber.
///
/// Level comes from `RUST_LOG` (default `info`); load `.env` before calling. No ANSI codes, so
/// the log file stays plain text. Fails if a global subscriber is already set.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = Arc::new(open_log_file(log_file_path)?);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let event_format = tracing_subscriber::fmt::format()
        .with_timer(ChronoLocal)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout.and(file))
        .event_format(event_format)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
