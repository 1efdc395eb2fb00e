use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for a batch run.
/// - RUST_LOG respected; default to "info,tzd=debug"
/// - TZD_LOG_JSON=1 switches to JSON lines
pub fn init(service_name: &str) {
    let default_filter = "info,tzd=debug";
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let json = std::env::var("TZD_LOG_JSON").is_ok_and(|v| !v.is_empty() && v != "0");

    let registry = tracing_subscriber::registry().with(EnvFilter::new(env_filter));
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(service = %service_name, "Logging initialized");
}
