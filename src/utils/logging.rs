//! Logging initialisation
//!
//! - Respects the RUST_LOG environment variable, which always wins
//! - Falls back to the filter from [`LoggingConfig`](crate::config::LoggingConfig)
//! - Defaults to "info"
//!
//! ```rust,no_run
//! use module_loader::utils::init_logging;
//!
//! init_logging(None);
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter: RUST_LOG, then the configured filter, then "info"
fn resolve_filter(filter: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(filter.unwrap_or("info"))
}

/// Initialize human-readable logging on stderr
///
/// ANSI colors are disabled when NO_COLOR is set.
pub fn init_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(resolve_filter(filter))
        .init();
}

/// Initialize logging with JSON output (for log aggregation)
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(resolve_filter(filter))
        .init();
}

/// Initialize logging from [`LoggingConfig`](crate::config::LoggingConfig)
///
/// A `filter` argument overrides the configured filter.
pub fn init_logging_from_config(
    config: Option<&crate::config::LoggingConfig>,
    filter: Option<&str>,
) {
    let filter = filter.or_else(|| config.and_then(|c| c.filter.as_deref()));

    if config.map(|c| c.json_format).unwrap_or(false) {
        #[cfg(feature = "json-logging")]
        {
            init_json_logging(filter);
        }
        #[cfg(not(feature = "json-logging"))]
        {
            // Fall back to regular logging if json-logging feature not enabled
            init_logging(filter);
        }
    } else {
        init_logging(filter);
    }
}
