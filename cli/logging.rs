use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "neatify_core=info,warn",
        _ => "neatify_core=debug,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
