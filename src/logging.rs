use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const CONSOLE_FILTER: &str = "warn,filter_extract=info,llm_request=warn,vector=info";
const FILE_FILTER: &str = "info,filter_extract=debug,llm_request=debug,vector=debug";

/// Console logs go to stderr so stdout stays clean for JSON output. `RUST_LOG`
/// overrides the console filter. The returned guard flushes the log file and
/// must be held until exit.
pub fn configure_logging(log_dir: &str) -> WorkerGuard {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_FILTER));
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(console_filter);

    let file_appender = rolling::daily(log_dir, "metaquery.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .init();

    guard
}
