//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile for the process-wide subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON lines at info level
    Production,
    /// No output; tests install their own capture layer
    Test,
}

static INIT_ONCE: Once = Once::new();

const DEFAULT_DEV_FILTER: &str = "pagenode=debug,pagenode_core=debug,pagenode_store=debug";
const DEFAULT_PROD_FILTER: &str = "pagenode=info,pagenode_core=info,pagenode_store=info";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber for `profile`
///
/// Only the first call has any effect. If another subscriber was already
/// installed (e.g. by [`init_test_capture`](super::init_test_capture)), the
/// existing one is kept.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter_or(DEFAULT_DEV_FILTER))
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_or(DEFAULT_PROD_FILTER))
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        // A subscriber set elsewhere wins
        let _ = installed;
    });
}
