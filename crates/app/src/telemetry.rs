use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset. Targets match by prefix, so this
/// covers every `perspecto_*` crate.
pub const DEFAULT_FILTER: &str = "perspecto=info";

/// Install the global tracing subscriber: `RUST_LOG` (or
/// [`DEFAULT_FILTER`]) plus the human-readable fmt layer.
///
/// Set `json` to emit one JSON object per event instead.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
