//! Tracing subscriber initialization.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Install the global subscriber: fmt layer plus an env filter seeded from
/// the CLI verbosity (`RUST_LOG` still overrides).
///
/// # Errors
/// Returns an error if a global subscriber is already set.
pub fn init(verbosity_level: Option<tracing::Level>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    // RUST_LOG=
    let env_filter = match verbosity_level {
        Some(level) => EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy(),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::ERROR.into())
            .from_env_lossy(),
    };

    let subscriber = Registry::default().with(fmt_layer).with(env_filter);

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
