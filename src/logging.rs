//! Tracing subscriber setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedding application's call. The CLI uses [`init_tracing`].

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "memoria=warn";

/// Pick the filter directive: `RUST_LOG`, then the configured one, then
/// `verbose` (one step per `-v`), then [`DEFAULT_FILTER`].
pub fn filter_directive(configured: Option<&str>, verbose: u8) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.is_empty() {
            return env;
        }
    }
    if let Some(configured) = configured {
        return configured.to_string();
    }
    match verbose {
        0 => DEFAULT_FILTER.to_string(),
        1 => "memoria=info".to_string(),
        2 => "memoria=debug".to_string(),
        _ => "memoria=trace".to_string(),
    }
}

/// Install a stderr `fmt` subscriber. Later calls are no-ops and return
/// `false`.
pub fn init_tracing(directive: &str) -> bool {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return false;
    }

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_beats_verbosity() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert_eq!(filter_directive(Some("memoria=trace"), 0), "memoria=trace");
        assert_eq!(filter_directive(None, 0), DEFAULT_FILTER);
        assert_eq!(filter_directive(None, 2), "memoria=debug");
        assert_eq!(filter_directive(None, 9), "memoria=trace");
    }

    #[test]
    fn test_second_init_is_noop() {
        init_tracing("memoria=off");
        assert!(!init_tracing("memoria=off"));
    }
}
