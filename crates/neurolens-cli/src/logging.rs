use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "NEUROLENS_LOG";

/// Log to stderr so stdout stays machine-readable.
///
/// `NEUROLENS_LOG` wins when set; otherwise `--verbose` selects debug and
/// the default is warn.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Already set only happens when a host initialized tracing first.
    if let Err(e) = Registry::default().with(env_filter).with(stderr_layer).try_init() {
        eprintln!("warning: tracing not initialized: {e}");
    }
}
