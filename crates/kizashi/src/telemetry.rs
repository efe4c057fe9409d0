use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console logging.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `info,kizashi=debug`,
/// or `debug` everywhere when `verbose`. With `json` each event is written
/// as one JSON object per line.
pub fn init_telemetry(verbose: bool, json: bool) {
    let default_filter = if verbose { "debug" } else { "info,kizashi=debug" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}
