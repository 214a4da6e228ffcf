//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::office::{Office, OfficeError};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to start LibreOfficeKit: {0}")]
    OfficeInit(#[from] OfficeError),

    #[error("Engine startup task failed: {0}")]
    Startup(#[from] tokio::task::JoinError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    office: Office,
}

impl AppState {
    /// Start the engine and build the state.
    ///
    /// Engine startup loads the whole office suite, so it runs on the
    /// blocking pool.
    pub async fn new(config: Config) -> Result<Self, StateError> {
        let office_config = config.office.clone();
        let office = tokio::task::spawn_blocking(move || match &office_config.user_profile {
            Some(profile) => Office::with_user_profile(&office_config.install_path, profile),
            None => Office::new(&office_config.install_path),
        })
        .await??;

        Ok(Self::with_office(config, office))
    }

    /// Build the state around an already running engine
    pub fn with_office(config: Config, office: Office) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, office }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the office handle
    pub fn office(&self) -> &Office {
        &self.inner.office
    }

    pub fn load_timeout(&self) -> Duration {
        self.inner.config.office.load_timeout()
    }
}
