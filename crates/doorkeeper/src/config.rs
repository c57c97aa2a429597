use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// How long an authorization prompt may stay unanswered before the login
/// attempt is reported as unauthorized.
const DEFAULT_AUTHORIZATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub discord_token: String,
    pub application_id: String,
    pub bind_address: String,
    pub authorization_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = vars
            .get("DATABASE_PATH")
            .cloned()
            .unwrap_or_else(|| "doorkeeper.db".to_string());

        let discord_token = vars
            .get("DISCORD_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?
            .clone();

        let application_id = vars
            .get("DISCORD_APPLICATION_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("DISCORD_APPLICATION_ID".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let authorization_timeout = match vars.get("AUTHORIZATION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ConfigError::InvalidValue(
                        "AUTHORIZATION_TIMEOUT_SECS".to_string(),
                        raw.clone(),
                    )
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "AUTHORIZATION_TIMEOUT_SECS".to_string(),
                        raw.clone(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_AUTHORIZATION_TIMEOUT_SECS),
        };

        Ok(Config {
            database_path,
            discord_token,
            application_id,
            bind_address,
            authorization_timeout,
        })
    }
}
