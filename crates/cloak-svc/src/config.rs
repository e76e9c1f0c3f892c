//! Configuration loading and validation for the service.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if a required variable is missing or
//! invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Name attached to every request span. **Required.**
    pub service_name: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Key used to obscure request and response bodies in logs. Without it,
    /// bodies are left out of the exchange log entirely.
    #[serde(default)]
    pub log_encryption_key: Option<String>,

    /// Whether `POST /users/reveal` may decrypt obscured payloads.
    #[serde(default)]
    pub enable_reveal: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_listen_port() -> u16 {
    8080
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("service_name", &self.service_name)
            .field("log_level", &self.log_level)
            .field("listen_port", &self.listen_port)
            .field(
                "log_encryption_key",
                &self.log_encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("enable_reveal", &self.enable_reveal)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    /// Values stay strings until deserialised, so a key such as `00123456`
    /// keeps its exact spelling.
    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The log key to install, if one is configured and non-blank.
    pub fn log_key(&self) -> Option<&str> {
        self.log_encryption_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.service_name, "SERVICE_NAME")?;
        ensure_non_empty(&self.log_level, "LOG_LEVEL")?;
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.enable_reveal && self.log_key().is_none() {
            anyhow::bail!("ENABLE_REVEAL requires LOG_ENCRYPTION_KEY to be set");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
