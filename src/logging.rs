// Logging setup shared by both binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "REVENUE_LOG";

/// Initialize tracing from REVENUE_LOG, falling back to `default_directive`.
///
/// Logs go to stderr so report output on stdout stays clean. Calling this
/// twice is a no-op.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
