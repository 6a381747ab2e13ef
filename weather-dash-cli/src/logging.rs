use tracing_subscriber::EnvFilter;

/// Log to stderr so rendered output on stdout stays clean. `RUST_LOG` overrides
/// the default `warn` level.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
