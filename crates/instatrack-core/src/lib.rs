pub mod activity;
pub mod app_config;
pub mod category;
pub mod config;
pub mod profiles;
pub mod providers;
pub mod seed;

pub use activity::{ActivityId, ActivityOutcome, ActivityRecord};
pub use app_config::{AppConfig, Environment, StorageBackend, StorageConfig};
pub use category::Category;
pub use config::{load_app_config, load_app_config_from_env};
pub use profiles::{
    normalize_username, MonitoredProfile, PollInterval, ProfileId, ProfileStatus,
};
pub use providers::{HealthStatus, ProviderConfig, ProviderId};
pub use seed::{load_seed, parse_seed, ProfileSeed, ProviderSeed, SeedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),

    #[error("seed validation failed: {0}")]
    Validation(String),
}
