use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "replay_ingress=debug,tower_http=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Initialize tracing.
///
/// `compact` is meant for consoles; `json` emits one object per event with the
/// current span's fields, for log collectors.
pub fn init_telemetry(log_format: &str) -> anyhow::Result<()> {
    match log_format {
        "json" => {
            let json_fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(json_fmt)
                .try_init()?;
        }
        _ => {
            let console_fmt = tracing_subscriber::fmt::layer().event_format(
                Format::default()
                    .compact()
                    .with_target(false)
                    .without_time(),
            );
            tracing_subscriber::registry()
                .with(env_filter())
                .with(console_fmt)
                .try_init()?;
        }
    }

    tracing::info!(log_format, "Tracing initialized");
    Ok(())
}
