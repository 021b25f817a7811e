pub mod entities;

// Re-export tracing for use in this crate
pub use tracing;

/// Install the process-wide tracing subscriber.
///
/// The log level is controlled via the RUST_LOG environment variable and
/// falls back to `info` when it is unset or unparsable.
#[cfg(not(test))]
pub fn init_tracing() {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();
}
