use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. Diagnostics go to stderr so the
/// participant-facing console output on stdout stays clean.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InitError::Subscriber(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}
