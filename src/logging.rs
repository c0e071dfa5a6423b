//! Log setup.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`). The dashboard
//! owns the terminal, so it either logs to a file or not at all.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const DEFAULT_FILTER: &str = "warn";

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(target: LogTarget<'_>) -> Result<(), AppError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(4, format!("Failed to create log file '{}': {e}", path.display())))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    };

    match installed {
        Ok(()) => Ok(()),
        // Lost a race with another initializer; its subscriber stays.
        Err(_) if tracing::dispatcher::has_been_set() => Ok(()),
        Err(e) => Err(AppError::new(4, format!("Failed to initialize logging: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_ok() {
        init(LogTarget::Stderr).unwrap();
        init(LogTarget::Stderr).unwrap();
        init(LogTarget::Off).unwrap();
    }
}
