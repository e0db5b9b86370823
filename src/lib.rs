//! Demo REST API — library crate shared by the binary and integration tests.

use chrono::Duration;

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;

use auth::{Credentials, TokenService};
use config::Config;
use errors::ConfigError;

/// Shared application state passed to handlers and middleware.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub credentials: Credentials,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, credentials: Credentials) -> Self {
        let tokens =
            TokenService::with_ttl(&config.secret_key, Duration::seconds(config.token_ttl_secs));
        Self {
            config,
            credentials,
            tokens,
        }
    }

    /// Load the credentials file named by `config` and assemble the state.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let credentials = Credentials::load(&config.auth_file)?;
        Ok(Self::new(config, credentials))
    }
}
