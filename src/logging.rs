//! Operator-facing diagnostics via `tracing`.
//!
//! Output goes to stderr unless a debug log file is given, so it does not
//! interleave with the chat transcript on stdout.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directive (e.g., `accessai=debug`).
pub const LOG_ENV: &str = "ACCESSAI_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Can only succeed once per process.
pub fn init(debug_log: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let directives = std::env::var(LOG_ENV).ok();
    subscriber(filter_from(directives.as_deref()), debug_log)?.try_init()?;
    Ok(())
}

/// Filter from user directives; blank or unparsable input means `warn`.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn subscriber(
    filter: EnvFilter,
    debug_log: Option<&Path>,
) -> io::Result<impl Subscriber + Send + Sync + 'static> {
    let (writer, ansi) = match debug_log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(ansi).with_writer(writer)))
}
