//! Tracing setup.
//!
//! The terminal UI owns stdout, so log lines go to a daily rolling file
//! instead. Keep the returned guard alive for as long as logging is needed;
//! dropping it flushes the background writer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(log_dir: &Path, filter: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "portal.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();

    guard
}
