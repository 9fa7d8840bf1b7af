//! Logging integration for tplsub.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-render spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log filter is read from `settings.log_level` (e.g. "debug", "info",
/// "`tplsub_template=trace`"). In debug mode a pretty, human-readable format is
/// used; otherwise a structured JSON format is used. Output goes to stderr so
/// it never mixes with rendered text.
///
/// Installing a second subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one render.
///
/// Enter this span around a render so that every function-call event logged
/// by the registry carries the render ID.
///
/// # Examples
///
/// ```
/// use tplsub_core::logging::render_span;
///
/// let span = render_span("report.tmpl");
/// let _guard = span.enter();
/// tracing::info!("rendering");
/// ```
pub fn render_span(render_id: &str) -> tracing::Span {
    tracing::info_span!("render", id = render_id)
}
