#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock},
};

use anyhow::{Result, bail};

use crate::constants::{DEFAULT_LOG_FILTER, DEFAULT_SCORE_FILE};

/// Runtime configuration shared across the crate, read from the environment.
#[derive(Debug, Clone)]
pub struct ConfigState {
    /// Where the `json` reporter writes the report.
    score_file: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive for the binary.
    log_filter: String,
}

impl ConfigState {
    /// Construct a new configuration instance from the environment.
    ///
    /// * `AUTOBADGER_SCORE_FILE` - report destination, defaults to
    ///   `score.json`
    /// * `AUTOBADGER_LOG` - log filter, defaults to `info`
    fn new() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let score_file = match lookup("AUTOBADGER_SCORE_FILE") {
            Some(value) if value.trim().is_empty() => {
                bail!("AUTOBADGER_SCORE_FILE is set but empty")
            }
            Some(value) => PathBuf::from(value.trim()),
            None => PathBuf::from(DEFAULT_SCORE_FILE),
        };

        let log_filter = lookup("AUTOBADGER_LOG")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            score_file,
            log_filter,
        })
    }

    /// Returns where the `json` reporter writes the report.
    pub fn score_file(&self) -> &Path {
        &self.score_file
    }

    /// Returns the log filter directive.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone, Debug)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = match slot().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}
