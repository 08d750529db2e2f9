use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "info,crimecast=debug";

/// Initialize logging/tracing.
/// - JSON logs, one object per line
/// - RUST_LOG respected; default to "info,crimecast=debug"
/// - fallback warnings carry a `fallback` field, so degraded predictions can
///   be counted from the log stream
pub fn init(service_name: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    let initialized = tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!(service = %service_name, "Observability initialized");
    }
}
