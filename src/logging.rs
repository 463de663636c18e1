//! Structured logging initialization for the binary.

use tracing_subscriber::EnvFilter;

/// Initialize console logging. `RUST_LOG` overrides the defaults;
/// debug mode raises the crate's own level to debug.
pub fn init(debug: bool) {
    let default_filter = if debug {
        "info,pinharvest=debug"
    } else {
        "warn,pinharvest=info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
