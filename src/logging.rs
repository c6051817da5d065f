use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const STDOUT_FILTER: &str = "info,web_request=info,render=warn,http=info,hyper=warn,reqwest=warn";
const FILE_FILTER: &str = "debug,web_request=debug,hyper=info,reqwest=info";

/// Stdout plus a daily rolling file under `log_dir`.
///
/// `RUST_LOG` replaces the stdout filter. The returned guard flushes the file
/// writer on drop, so keep it alive for the life of the process.
pub fn configure_logging(app_name: &str, log_dir: &str) -> WorkerGuard {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(STDOUT_FILTER));
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(stdout_filter);

    let file_appender = rolling::daily(log_dir, format!("{}.log", app_name));
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();

    guard
}

/// Stderr only, for the terminal tools whose stdout carries the rendered output.
pub fn configure_cli_logging(verbose: bool) {
    let default = if verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::Registry::default()
        .with(fmt::layer().with_writer(io::stderr).with_filter(filter))
        .init();
}
