// Diagnostic logging
//
// Tracing output goes to stderr so it never interleaves with solutions on
// stdout. The filter comes from PLCONSOLE_LOG, falling back to the config's
// debug_logging switch.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Filter directive used when PLCONSOLE_LOG is unset or empty
fn default_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "plconsole=debug"
    } else {
        "warn"
    }
}

/// Build the filter from an optional PLCONSOLE_LOG value
fn build_filter(env_value: Option<&str>, debug_logging: bool) -> EnvFilter {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(directive) => EnvFilter::try_new(directive)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_logging))),
        None => EnvFilter::new(default_directive(debug_logging)),
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_logging(debug_logging: bool) {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env_value.as_deref(), debug_logging);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
