//! Logging configuration for the hooks
//!
//! Diagnostics go through `tracing` and are written to stderr so that the
//! wrapped tool's stdout is left untouched.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging system
///
/// `verbose` raises the default level from `warn` to `debug`; `RUST_LOG`
/// always takes precedence. Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("cmake_pc_hooks={}", level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .compact()
        .with_ansi(console::colors_enabled_stderr())
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
