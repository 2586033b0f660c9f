// file: src/tracing_setup.rs
// description: structured logging configuration and tracing initialization
// reference: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets that `--log-level` applies to: the library and the binary.
const LOG_TARGETS: [&str; 2] = ["wallet_ui_bindings", "wallet_ui"];

/// Directive string for `log_level`, e.g. `wallet_ui_bindings=debug,wallet_ui=debug`.
pub fn default_directives(log_level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, log_level))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level` when set.
///
/// Logs go to stderr so they never interleave with the rendered view.
pub fn setup_tracing(log_level: &str, json_logs: bool) -> Result<()> {
    let fmt_layer = if json_logs {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
