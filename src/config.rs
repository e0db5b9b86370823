use std::fmt;
use std::path::PathBuf;

use crate::auth::token::DEFAULT_TOKEN_TTL_SECS;
use crate::errors::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AUTH_FILE: &str = "auth.json";

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// HMAC secret for signing bearer tokens. Set via DEMO_SECRET_KEY.
    pub secret_key: String,
    /// JSON file holding the single `username`/`password` pair.
    pub auth_file: PathBuf,
    /// When false, every route is public (the gate becomes a no-op).
    pub auth_enabled: bool,
    pub token_ttl_secs: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret_key", &"****")
            .field("auth_file", &self.auth_file)
            .field("auth_enabled", &self.auth_enabled)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl Config {
    /// Defaults for everything but the secret.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secret_key: secret_key.into(),
            auth_file: PathBuf::from(DEFAULT_AUTH_FILE),
            auth_enabled: true,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration from the process environment (and `.env`, if present).
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a `Config` from an arbitrary key lookup.
pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let secret_key = get("DEMO_SECRET_KEY")
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingSecret)?;

    let mut cfg = Config::new(secret_key);

    if let Some(host) = get("DEMO_HOST") {
        cfg.host = host;
    }
    if let Some(port) = get("DEMO_PORT") {
        cfg.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
    }
    if let Some(path) = get("DEMO_AUTH_FILE") {
        cfg.auth_file = PathBuf::from(path);
    }
    if let Some(flag) = get("DEMO_AUTH_ENABLED") {
        cfg.auth_enabled = parse_bool(&flag).ok_or(ConfigError::InvalidFlag {
            name: "DEMO_AUTH_ENABLED",
            value: flag.clone(),
        })?;
    }
    if let Some(ttl) = get("DEMO_TOKEN_TTL_SECS") {
        cfg.token_ttl_secs = ttl
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidFlag {
                name: "DEMO_TOKEN_TTL_SECS",
                value: ttl.clone(),
            })?;
    }

    Ok(cfg)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
