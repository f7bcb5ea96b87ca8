use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise stderr logging for the CLI.
///
/// `RUST_LOG` takes precedence over `level`, which applies to the mdsweep
/// crates only.
pub fn init_logging(level: &str) {
    let default_filter = format!("mdsweep={level},mdsweep_exp={level},mdsweep_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    // a second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
