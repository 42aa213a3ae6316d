//! Diagnostics channel
//!
//! catlog reports its own failures (a log file that cannot be created, a
//! destination that rejects a message, a failed retention delete) as
//! `tracing` events. Applications that already install a subscriber get
//! these for free; others can call [`init_diagnostics`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Filter used when neither `RUST_LOG` nor an explicit filter is given
pub const DEFAULT_FILTER: &str = "catlog=warn";

/// Build the diagnostics filter
///
/// `RUST_LOG` takes precedence over `fallback`.
pub fn diagnostics_filter(fallback: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(fallback.unwrap_or(DEFAULT_FILTER))
        .map_err(|e| Error::Config(format!("invalid diagnostics filter: {}", e)))
}

/// Install a global stderr subscriber for catlog's own events
///
/// Fails when a global subscriber is already installed.
pub fn init_diagnostics(fallback: Option<&str>) -> Result<()> {
    let filter = diagnostics_filter(fallback)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("diagnostics already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_diagnostics(None);
        assert!(matches!(init_diagnostics(None), Err(Error::Config(_))));
    }

    #[test]
    fn test_custom_filter_is_accepted() {
        assert!(diagnostics_filter(Some("catlog=debug,warn")).is_ok());
    }
}
