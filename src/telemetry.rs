//! Opt-in `tracing` subscriber setup for hosts and the replay binary.
//!
//! The library only emits events. Installing a subscriber is left to the
//! embedding application, or to the helpers below when the `telemetry`
//! feature is enabled.

/// Environment variable read by [`init_default_tracing`].
pub const LOG_ENV: &str = "CHART_JOIN_LOG";

/// Directive used when [`LOG_ENV`] is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "chart_join=info";

/// Installs a compact stderr subscriber filtered by [`LOG_ENV`].
///
/// Returns `false` without the `telemetry` feature or when a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directive = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_DIRECTIVE.to_owned());
    init_tracing(&directive)
}

/// Installs a compact stderr subscriber for an explicit filter directive,
/// such as `"chart_join::animation=trace"`.
#[must_use]
pub fn init_tracing(directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_new(directive)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVE));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directive;
        false
    }
}
