//! Tracing subscriber setup
//!
//! Diagnostics go to stderr so stdout stays reserved for task output and
//! prompts. `RUST_LOG` overrides the level picked from the debug flag.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive for a debug flag
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "webpilot=debug"
    } else {
        "webpilot=info"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
