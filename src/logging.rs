//! Development-time tracing for debugging the loop driver.
//!
//! Diagnostics go to stderr under `RUST_LOG` control. Product output — the
//! iteration banner, the invocation summary, and relayed `claude` output —
//! is written to stdout/stderr directly and never routed through tracing.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=claude_loop=debug claude-loop "fix the failing test"
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
