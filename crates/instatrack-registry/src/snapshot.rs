//! Full-state snapshots and their JSON persistence.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use instatrack_core::{
    ActivityRecord, ConfigError, HealthStatus, MonitoredProfile, ProfileStatus, ProviderConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{ActivityLog, ActivitySummary};
use crate::profiles::ProfileSchedule;
use crate::providers::ProviderRegistry;
use crate::RegistryError;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot content is invalid: {0}")]
    Invalid(#[from] RegistryError),

    #[error("failed to load seed: {0}")]
    Seed(#[from] ConfigError),
}

/// Immutable view of every registry at one instant.
///
/// Each registry sits behind its own `Arc`, so cloning a snapshot is cheap
/// and a command copies only the registry it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub providers: Arc<ProviderRegistry>,
    pub profiles: Arc<ProfileSchedule>,
    pub activity: Arc<ActivityLog>,
    pub taken_at: DateTime<Utc>,
}

/// On-disk shape; converted through the registry constructors on load.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    providers: Vec<ProviderConfig>,
    #[serde(default)]
    profiles: Vec<MonitoredProfile>,
    #[serde(default)]
    activity: Vec<ActivityRecord>,
    taken_at: DateTime<Utc>,
}

impl TryFrom<SnapshotFile> for Snapshot {
    type Error = RegistryError;

    fn try_from(file: SnapshotFile) -> Result<Self, Self::Error> {
        Ok(Snapshot {
            providers: Arc::new(ProviderRegistry::from_providers(file.providers)?),
            profiles: Arc::new(ProfileSchedule::from_profiles(file.profiles)?),
            activity: Arc::new(ActivityLog::from_records(file.activity)),
            taken_at: file.taken_at,
        })
    }
}

/// Headline numbers for the overview screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub profiles_total: usize,
    pub profiles_active: usize,
    pub profiles_paused: usize,
    pub profiles_in_error: usize,
    pub media_collected: u64,
    pub providers_online: usize,
    pub providers_degraded: usize,
    pub providers_offline: usize,
    pub activity: ActivitySummary,
}

impl Snapshot {
    /// Writable provider registry, detached from published snapshots.
    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        Arc::make_mut(&mut self.providers)
    }

    pub fn profiles_mut(&mut self) -> &mut ProfileSchedule {
        Arc::make_mut(&mut self.profiles)
    }

    pub fn activity_mut(&mut self) -> &mut ActivityLog {
        Arc::make_mut(&mut self.activity)
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardStats {
        let mut stats = DashboardStats {
            activity: self.activity.summary(),
            ..DashboardStats::default()
        };

        for profile in self.profiles.iter() {
            stats.profiles_total += 1;
            stats.media_collected = stats
                .media_collected
                .saturating_add(profile.total_media_collected);
            match profile.status {
                ProfileStatus::Active => stats.profiles_active += 1,
                ProfileStatus::Paused => stats.profiles_paused += 1,
                ProfileStatus::Error => stats.profiles_in_error += 1,
            }
        }

        for provider in self.providers.iter() {
            match provider.health {
                HealthStatus::Online => stats.providers_online += 1,
                HealthStatus::Degraded => stats.providers_degraded += 1,
                HealthStatus::Offline => stats.providers_offline += 1,
            }
        }

        stats
    }
}

/// Write the snapshot as pretty JSON, replacing any previous file atomically.
///
/// Each call writes its own uniquely named temp file next to `path`, so
/// concurrent saves never collide. The temp file is removed if the save
/// fails.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the temp file cannot be written or
/// moved into place, or [`SnapshotError::Json`] if serialization fails.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let io_err = |source: std::io::Error| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    };

    let body = serde_json::to_vec_pretty(snapshot)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&body).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::info!(
        path = %path.display(),
        providers = snapshot.providers.len(),
        profiles = snapshot.profiles.len(),
        activity = snapshot.activity.len(),
        "snapshot saved"
    );
    Ok(())
}

/// Read and re-validate a snapshot written by [`save_snapshot`].
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be read,
/// [`SnapshotError::Json`] if it does not parse, or
/// [`SnapshotError::Invalid`] if it breaks a registry invariant.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = std::fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: SnapshotFile = serde_json::from_slice(&content)?;
    let snapshot = Snapshot::try_from(file)?;

    tracing::info!(
        path = %path.display(),
        providers = snapshot.providers.len(),
        profiles = snapshot.profiles.len(),
        activity = snapshot.activity.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
