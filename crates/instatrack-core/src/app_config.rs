use std::path::PathBuf;

use crate::profiles::PollInterval;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// S3-compatible object store flavour used for extracted media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    R2,
    Aws,
    Minio,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::R2 => write!(f, "r2"),
            StorageBackend::Aws => write!(f, "aws"),
            StorageBackend::Minio => write!(f, "minio"),
        }
    }
}

#[derive(Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_url: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &"[redacted]")
            .field("secret_access_key", &"[redacted]")
            .field("public_url", &self.public_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub seed_path: PathBuf,
    pub snapshot_path: Option<PathBuf>,
    pub default_poll_interval: PollInterval,
    pub storage: Option<StorageConfig>,
}
