//! Process initialization: `.env` loading and the tracing subscriber

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static ENV_INIT: Once = Once::new();
static TRACING_INIT: Once = Once::new();

/// Load environment variables from a `.env` file, if one exists
///
/// Searches the current directory and its parents. Safe to call multiple
/// times - the file is only read once per process.
pub fn initialize_environment() {
    ENV_INIT.call_once(|| {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!(error = %e, "Failed to load .env file");
        }
    });
}

/// Options for [`init_tracing`]
#[derive(Debug, Clone)]
pub struct TracingOptions {
    /// Level used when `RUST_LOG` is not set (trace, debug, info, warn, error)
    pub default_level: String,
    /// Emit JSON lines instead of the human readable format
    pub json: bool,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `options.default_level`. Subsequent calls are no-ops,
/// as is a call made after some other subscriber was installed.
pub fn init_tracing(options: &TracingOptions) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&options.default_level));

        let result = if options.json {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .try_init()
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).try_init()
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Tracing subscriber already installed");
        }
    });
}
