use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::profiles::{normalize_username, PollInterval, ProfileStatus};
use crate::providers::{HealthStatus, ProviderConfig, ProviderId};
use crate::ConfigError;

fn default_health() -> HealthStatus {
    HealthStatus::Online
}

fn default_success_rate() -> f64 {
    100.0
}

fn default_status() -> ProfileStatus {
    ProfileStatus::Active
}

/// A provider entry in the seed file. File order is registry order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSeed {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub endpoint: String,
    #[serde(default = "default_health")]
    pub health: HealthStatus,
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    #[serde(default)]
    pub total_requests: u64,
}

impl ProviderSeed {
    #[must_use]
    pub fn into_config(self) -> ProviderConfig {
        ProviderConfig {
            id: ProviderId::new(self.id),
            name: self.name,
            category: self.category,
            endpoint: self.endpoint,
            health: self.health,
            success_rate: self.success_rate,
            total_requests: self.total_requests,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSeed {
    pub username: String,
    pub display_name: String,
    #[serde(default = "default_status")]
    pub status: ProfileStatus,
    /// Unset entries take the configured default interval when seeded.
    #[serde(rename = "poll_interval_hours", default)]
    pub poll_interval: Option<PollInterval>,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total_media_collected: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub providers: Vec<ProviderSeed>,
    #[serde(default)]
    pub profiles: Vec<ProfileSeed>,
}

/// Load and validate the seed file from YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_seed(&content)
}

/// Parse and validate seed YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_seed(content: &str) -> Result<SeedFile, ConfigError> {
    let seed: SeedFile = serde_yaml::from_str(content)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for provider in &seed.providers {
        if provider.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "provider id must be non-empty".to_string(),
            ));
        }

        if provider.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "provider '{}' must have a non-empty name",
                provider.id
            )));
        }

        if provider.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "provider '{}' must have a non-empty endpoint",
                provider.id
            )));
        }

        if !(0.0..=100.0).contains(&provider.success_rate) {
            return Err(ConfigError::Validation(format!(
                "provider '{}' has success rate {} outside 0..=100",
                provider.id, provider.success_rate
            )));
        }

        if !seen_ids.insert(provider.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate provider id: '{}'",
                provider.id
            )));
        }
    }

    let mut seen_usernames = HashSet::new();

    for profile in &seed.profiles {
        let username = normalize_username(&profile.username);
        if username.is_empty() {
            return Err(ConfigError::Validation(
                "profile username must be non-empty".to_string(),
            ));
        }

        if profile.categories.is_empty() {
            return Err(ConfigError::Validation(format!(
                "profile '{username}' must track at least one category"
            )));
        }

        if !seen_usernames.insert(username.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate profile username: '{username}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
