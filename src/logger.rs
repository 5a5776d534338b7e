//! Logging initialisation via tracing-subscriber.
//!
//! The filter comes from, in order: repeated `-v` flags, `RUST_LOG`, the
//! configured `server.log_level`. Call [`init`] once, after the config is
//! loaded.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Level requested by `count` repeated `-v` flags (`-v` warn through
/// `-vvvv` trace). `None` when no flag was given.
pub fn verbosity_level(count: u8) -> Option<&'static str> {
    match count {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Pick the filter directive in effect. An unparsable `RUST_LOG` is skipped
/// in favour of the configured level.
fn select_directive(
    configured: &str,
    verbosity: u8,
    rust_log: Option<&str>,
) -> Result<String, AppError> {
    if let Some(level) = verbosity_level(verbosity) {
        return Ok(level.to_string());
    }
    if let Some(env) = rust_log.filter(|d| !d.trim().is_empty()) {
        if EnvFilter::try_new(env).is_ok() {
            return Ok(env.to_string());
        }
    }
    EnvFilter::try_new(configured)
        .map(|_| configured.to_string())
        .map_err(|e| AppError::Logger(format!("invalid log level '{configured}': {e}")))
}

/// Install the global subscriber, writing to stderr. Returns the filter
/// directive that was applied.
pub fn init(configured: &str, verbosity: u8) -> Result<String, AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = select_directive(configured, verbosity, rust_log.as_deref())?;
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| AppError::Logger(format!("invalid log level '{directive}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(directive)
}
