//! Shared tracker state.
//!
//! Writers are serialized through one mutex guarding a working copy of every
//! registry. After each successful command the working copy is published as
//! a fresh `Arc<Snapshot>`; readers clone that `Arc` and never hold a lock
//! while they inspect it. Registries are copy-on-write: a command copies only
//! the registry it touches, and untouched ones stay shared with earlier
//! snapshots.

use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use instatrack_core::{
    ActivityRecord, AppConfig, Category, HealthStatus, MonitoredProfile, PollInterval, ProfileId,
    ProfileStatus, ProviderConfig, ProviderId, SeedFile,
};

use crate::profiles::{CategoryToggle, NewProfile};
use crate::providers::{FallbackChain, MoveOutcome, ProviderEdit};
use crate::snapshot::{load_snapshot, save_snapshot, Snapshot, SnapshotError};
use crate::RegistryError;

pub struct TrackerState {
    writer: Mutex<Snapshot>,
    published: RwLock<Arc<Snapshot>>,
    default_interval: PollInterval,
}

impl TrackerState {
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            published: RwLock::new(Arc::new(snapshot.clone())),
            writer: Mutex::new(snapshot),
            default_interval: PollInterval::default(),
        }
    }

    /// Interval given to created profiles that do not choose one.
    #[must_use]
    pub fn with_default_interval(mut self, interval: PollInterval) -> Self {
        self.default_interval = interval;
        self
    }

    #[must_use]
    pub fn default_interval(&self) -> PollInterval {
        self.default_interval
    }

    /// Build state from a validated seed file, in file order. Profiles
    /// without an interval get `default_interval`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] a seed entry triggers.
    pub fn from_seed(seed: SeedFile, default_interval: PollInterval) -> Result<Self, RegistryError> {
        let mut snapshot = Snapshot::default();

        let providers = snapshot.providers_mut();
        for provider in seed.providers {
            providers.add(provider.into_config())?;
        }

        let profiles = snapshot.profiles_mut();
        for profile in seed.profiles {
            let new = NewProfile {
                poll_interval: profile.poll_interval,
                ..NewProfile::new(profile.username, profile.display_name)
            }
            .categories(profile.categories)
            .status(profile.status)
            .with_default_interval(default_interval);

            let created = profiles.create(new)?;
            profiles.set_total_media(created.id, profile.total_media_collected)?;
        }

        snapshot.taken_at = Utc::now();
        tracing::info!(
            providers = snapshot.providers.len(),
            profiles = snapshot.profiles.len(),
            %default_interval,
            "tracker state seeded"
        );
        Ok(Self::new(snapshot).with_default_interval(default_interval))
    }

    /// Restore from the configured snapshot when one exists on disk,
    /// otherwise start from the seed file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the snapshot or seed cannot be loaded.
    pub fn bootstrap(config: &AppConfig) -> Result<Self, SnapshotError> {
        let interval = config.default_poll_interval;
        if let Some(path) = config.snapshot_path.as_deref().filter(|p| p.exists()) {
            return Ok(Self::new(load_snapshot(path)?).with_default_interval(interval));
        }

        let seed = instatrack_core::load_seed(&config.seed_path)?;
        Ok(Self::from_seed(seed, interval)?)
    }

    /// The latest published state.
    ///
    /// # Errors
    ///
    /// [`RegistryError::LockPoisoned`] if a writer panicked mid-publish.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>, RegistryError> {
        let guard = self
            .published
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(Arc::clone(&guard))
    }

    /// Save the latest published state to `path`. Safe to call from several
    /// threads at once.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the state cannot be read or written.
    pub fn persist(&self, path: &std::path::Path) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot()?;
        save_snapshot(path, &snapshot)
    }

    fn mutate<T>(
        &self,
        command: impl FnOnce(&mut Snapshot) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut working = self.writer.lock().map_err(|_| RegistryError::LockPoisoned)?;
        let output = command(&mut working)?;
        working.taken_at = Utc::now();
        let next = Arc::new(working.clone());

        let mut published = self
            .published
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        *published = next;
        Ok(output)
    }

    // Provider commands

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::add`].
    pub fn add_provider(&self, provider: ProviderConfig) -> Result<usize, RegistryError> {
        self.mutate(|s| s.providers_mut().add(provider))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::remove`].
    pub fn remove_provider(&self, id: &ProviderId) -> Result<ProviderConfig, RegistryError> {
        self.mutate(|s| s.providers_mut().remove(id))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::move_up`].
    pub fn move_provider_up(&self, id: &ProviderId) -> Result<MoveOutcome, RegistryError> {
        self.mutate(|s| s.providers_mut().move_up(id))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::move_down`].
    pub fn move_provider_down(&self, id: &ProviderId) -> Result<MoveOutcome, RegistryError> {
        self.mutate(|s| s.providers_mut().move_down(id))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::set_health`].
    pub fn set_provider_health(
        &self,
        id: &ProviderId,
        status: HealthStatus,
    ) -> Result<(), RegistryError> {
        self.mutate(|s| s.providers_mut().set_health(id, status))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::update`].
    pub fn update_provider(
        &self,
        id: &ProviderId,
        edit: ProviderEdit,
    ) -> Result<ProviderConfig, RegistryError> {
        self.mutate(|s| s.providers_mut().update(id, edit))
    }

    /// # Errors
    ///
    /// See [`crate::ProviderRegistry::record_request`].
    pub fn record_provider_request(
        &self,
        id: &ProviderId,
        succeeded: bool,
    ) -> Result<(), RegistryError> {
        self.mutate(|s| s.providers_mut().record_request(id, succeeded))
    }

    /// # Errors
    ///
    /// [`RegistryError::LockPoisoned`] only.
    pub fn resolve(&self, category: Category) -> Result<FallbackChain, RegistryError> {
        Ok(self.snapshot()?.providers.resolve(category))
    }

    // Profile commands

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::create`].
    pub fn create_profile(&self, new: NewProfile) -> Result<MonitoredProfile, RegistryError> {
        let new = new.with_default_interval(self.default_interval);
        self.mutate(|s| s.profiles_mut().create(new))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::toggle_category`].
    pub fn toggle_profile_category(
        &self,
        id: ProfileId,
        category: Category,
    ) -> Result<CategoryToggle, RegistryError> {
        self.mutate(|s| s.profiles_mut().toggle_category(id, category))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::update_status`].
    pub fn update_profile_status(
        &self,
        id: ProfileId,
        status: ProfileStatus,
    ) -> Result<ProfileStatus, RegistryError> {
        self.mutate(|s| s.profiles_mut().update_status(id, status))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::set_poll_interval`].
    pub fn set_profile_poll_interval(
        &self,
        id: ProfileId,
        interval: PollInterval,
    ) -> Result<(), RegistryError> {
        self.mutate(|s| s.profiles_mut().set_poll_interval(id, interval))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::rename`].
    pub fn rename_profile(&self, id: ProfileId, display_name: &str) -> Result<(), RegistryError> {
        self.mutate(|s| s.profiles_mut().rename(id, display_name))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::record_poll`].
    pub fn record_poll(
        &self,
        id: ProfileId,
        at: DateTime<Utc>,
        media_collected: u64,
    ) -> Result<(), RegistryError> {
        self.mutate(|s| s.profiles_mut().record_poll(id, at, media_collected))
    }

    /// # Errors
    ///
    /// See [`crate::ProfileSchedule::delete`].
    pub fn delete_profile(&self, id: ProfileId) -> Result<MonitoredProfile, RegistryError> {
        self.mutate(|s| s.profiles_mut().delete(id))
    }

    /// Active profiles owed a poll at `now`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::LockPoisoned`] only.
    pub fn due_profiles(&self, now: DateTime<Utc>) -> Result<Vec<MonitoredProfile>, RegistryError> {
        Ok(self
            .snapshot()?
            .profiles
            .due_profiles(now)
            .into_iter()
            .cloned()
            .collect())
    }

    // Activity

    /// Append an extraction outcome to the log.
    ///
    /// # Errors
    ///
    /// [`RegistryError::LockPoisoned`] only.
    pub fn record_activity(&self, record: ActivityRecord) -> Result<(), RegistryError> {
        self.mutate(|s| {
            s.activity_mut().append(record);
            Ok(())
        })
    }
}
