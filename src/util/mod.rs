// (c) 2025 Ross Younger

//! General utility code

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

#[cfg(test)]
pub(crate) mod test_protocol;

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Environment variable that controls what gets logged
const STANDARD_ENV_VAR: &str = "RUST_LOG";

/// Sets up the tracing subsystem.
/// `RUST_LOG`, if set, overrides the requested level.
pub(crate) fn setup_tracing(trace_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_env(STANDARD_ENV_VAR) {
        Ok(filter) => filter,
        Err(e) => {
            // The env var was unset or invalid. Which is it?
            if std::env::var(STANDARD_ENV_VAR).is_ok() {
                anyhow::bail!("{STANDARD_ENV_VAR} (set in environment) was not understood: {e}");
            }
            EnvFilter::try_new(format!("cubby={trace_level}"))?
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    TRACING_INITIALIZED.store(true, Ordering::Relaxed);
    Ok(())
}

/// Has [`setup_tracing`] run in this process?
#[must_use]
pub fn tracing_is_initialised() -> bool {
    TRACING_INITIALIZED.load(Ordering::Relaxed)
}
