//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "company_directory_graphql={0},company_directory={0},tower_http=info",
            config.log_level
        ))
    });

    let builder = fmt().with_env_filter(filter).with_target(true);

    let _ = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
