use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. Logs go to stderr; stdout is reserved
/// for results.
///
/// `RUST_LOG` takes precedence over the default filter.
pub fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "store_search=debug"
    } else {
        "store_search=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let fmt_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(filter));

    // The console layer carries its own filter for tokio's instrumentation.
    #[cfg(feature = "tokio-console")]
    let registry = registry.with(console_subscriber::spawn());

    registry.init();
}
