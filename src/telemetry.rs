use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LedgerConfig;

static TRACING_INIT: Once = Once::new();

/// Installs the global fmt subscriber using the configured filter.
///
/// Only the first call has an effect. A filter that fails to parse falls back to `info`.
pub fn init_tracing(config: &LedgerConfig) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

        // another subscriber may already be installed by the host application
        if fmt().with_env_filter(filter).try_init().is_ok() {
            tracing::info!(filter = %config.log_filter, "loan ledger tracing initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LedgerConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
