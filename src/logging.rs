use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter (`RUST_LOG` syntax).
pub const LOG_ENV: &str = "WEBGEN_CODEVIEW_LOG";

/// Install the global subscriber: stderr output, filtered by
/// `WEBGEN_CODEVIEW_LOG` with `warn` as the default. Stdout stays reserved
/// for rendered output. Calling it twice is harmless.
pub fn init() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init();
}
