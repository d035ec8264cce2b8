//! Tracing subscriber setup for host applications.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable read for the log filter (e.g. `vitura_core=debug`).
pub const LOG_ENV: &str = "VITURA_LOG";

/// Install a global fmt subscriber.
///
/// `default_filter` applies when `VITURA_LOG` is unset or invalid. Returns
/// false when a global subscriber was already installed.
pub fn init_logging(default_filter: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // The first call may lose to another test; the second always does.
        init_logging("info", false);
        assert!(!init_logging("info", true));
    }
}
