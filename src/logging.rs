use crate::config::LedgerConfig;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info";

/// Filter from `directive`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global fmt subscriber. Returns `false` when a subscriber was
/// already installed.
pub fn init_logging(directive: Option<&str>) -> bool {
    fmt()
        .with_env_filter(env_filter(directive))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init_logging`] driven by the configured `log_filter`.
pub fn init_from_config(config: &LedgerConfig) -> bool {
    init_logging(config.log_filter.as_deref())
}
