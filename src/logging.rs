//! Log output setup.
//!
//! The library only emits `tracing` events; embedding applications call
//! [`init_logging`] once to get them printed on stderr.

use std::sync::OnceLock;

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingSettings;

/// Environment variable overriding the configured filter.
pub const LOG_ENV_VAR: &str = "ROWGRAPH_LOG";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(settings: &LoggingSettings) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(settings);

        let layer: Box<dyn Layer<Registry> + Send + Sync> = if settings.json {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .boxed()
        };

        // another subscriber may already be installed by the host
        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }

        tracing::debug!(level = %settings.level, json = settings.json, "logging initialized");
    });
}

/// `ROWGRAPH_LOG` when set and valid, else the configured level.
fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
