use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_directives`
/// when it parses.
pub fn init_logging(default_directives: &str) {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter_layer = build_filter(from_env.as_deref(), default_directives);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn build_filter(from_env: Option<&str>, default_directives: &str) -> EnvFilter {
    from_env
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives))
}
