use crate::app_config::{AppConfig, Environment, StorageBackend, StorageConfig};
use crate::profiles::PollInterval;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u8>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("INSTATRACK_ENV", "development"))?;
    let log_level = or_default("INSTATRACK_LOG_LEVEL", "info");
    let seed_path = PathBuf::from(or_default("INSTATRACK_SEED_PATH", "./config/tracker.yaml"));
    let snapshot_path = lookup("INSTATRACK_SNAPSHOT_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let interval_hours = parse_u8("INSTATRACK_DEFAULT_POLL_INTERVAL_HOURS", "6")?;
    let default_poll_interval =
        PollInterval::try_from(interval_hours).map_err(|reason| ConfigError::InvalidEnvVar {
            var: "INSTATRACK_DEFAULT_POLL_INTERVAL_HOURS".to_string(),
            reason,
        })?;

    let storage = build_storage_config(&lookup)?;

    Ok(AppConfig {
        env,
        log_level,
        seed_path,
        snapshot_path,
        default_poll_interval,
        storage,
    })
}

/// Storage is optional as a whole; once an endpoint is given, the bucket and
/// both credentials become required.
fn build_storage_config<F>(lookup: &F) -> Result<Option<StorageConfig>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let Ok(endpoint) = lookup("INSTATRACK_STORAGE_ENDPOINT") else {
        return Ok(None);
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let backend = parse_storage_backend(
        &lookup("INSTATRACK_STORAGE_BACKEND").unwrap_or_else(|_| "r2".to_string()),
    )?;
    let bucket = require("INSTATRACK_STORAGE_BUCKET")?;
    let access_key_id = require("INSTATRACK_STORAGE_ACCESS_KEY_ID")?;
    let secret_access_key = require("INSTATRACK_STORAGE_SECRET_ACCESS_KEY")?;
    let region = lookup("INSTATRACK_STORAGE_REGION").unwrap_or_else(|_| "auto".to_string());
    let public_url = lookup("INSTATRACK_STORAGE_PUBLIC_URL").ok();

    Ok(Some(StorageConfig {
        backend,
        endpoint,
        bucket,
        region,
        access_key_id,
        secret_access_key,
        public_url,
    }))
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INSTATRACK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_storage_backend(s: &str) -> Result<StorageBackend, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "r2" => Ok(StorageBackend::R2),
        "aws" | "s3" => Ok(StorageBackend::Aws),
        "minio" => Ok(StorageBackend::Minio),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INSTATRACK_STORAGE_BACKEND".to_string(),
            reason: format!("unknown storage backend '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
