use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Log targets owned by this workspace (crate names as they appear in module paths).
pub const WORKSPACE_TARGETS: [&str; 5] = [
    "rag_gateway",
    "history_store",
    "reindex_monitor",
    "qa_session",
    "ragc",
];

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        // Keep timestamps compact: no fractional seconds, Z-suffix
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build the formatting layer used by the `ragc` binary.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with target
/// - ANSI colors only when stderr is a terminal
/// - Writes to stderr so command output on stdout stays clean
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_ansi(use_ansi)
        .event_format(fmt::format().compact())
}

/// Level directives for every workspace crate, e.g. `qa_session=debug`.
pub fn workspace_directives(level: Level) -> Vec<Directive> {
    let level = level.as_str().to_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .filter_map(|target| format!("{target}={level}").parse::<Directive>().ok())
        .collect()
}

/// Convenience: create an EnvFilter from `RUST_LOG` or fallback default,
/// then optionally raise workspace crates to `level`.
///
/// Example: `default = "warn"`, `level = Some(Level::DEBUG)` shows warnings from
/// dependencies and debug output from this workspace only.
pub fn env_filter_with_level(default: &str, level: Option<Level>) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match level {
        Some(level) => workspace_directives(level)
            .into_iter()
            .fold(base, |filter, directive| filter.add_directive(directive)),
        None => base,
    }
}
