//! Profile scheduling model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use instatrack_core::{
    normalize_username, Category, MonitoredProfile, PollInterval, ProfileId, ProfileStatus,
};
use serde::Serialize;

use crate::providers::ProviderRegistry;
use crate::RegistryError;

/// Input for [`ProfileSchedule::create`].
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub display_name: String,
    pub categories: BTreeSet<Category>,
    /// `None` falls back to [`PollInterval::default`] unless a default was
    /// supplied through [`NewProfile::with_default_interval`].
    pub poll_interval: Option<PollInterval>,
    pub status: ProfileStatus,
}

impl NewProfile {
    /// An active profile tracking both categories, with no interval chosen.
    #[must_use]
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
            categories: Category::ALL.into_iter().collect(),
            poll_interval: None,
            status: ProfileStatus::Active,
        }
    }

    #[must_use]
    pub fn categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: PollInterval) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Use `interval` only if none was chosen explicitly.
    #[must_use]
    pub fn with_default_interval(mut self, interval: PollInterval) -> Self {
        self.poll_interval.get_or_insert(interval);
        self
    }

    #[must_use]
    pub fn status(mut self, status: ProfileStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryToggle {
    Added,
    Removed,
}

/// Whether every category a profile tracks has a provider that can serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleViability {
    pub profile_id: ProfileId,
    /// Tracked categories whose fallback chain has no usable provider.
    pub uncovered: Vec<Category>,
}

impl ScheduleViability {
    #[must_use]
    pub fn is_viable(&self) -> bool {
        self.uncovered.is_empty()
    }
}

/// Monitored profiles in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileSchedule {
    profiles: Vec<MonitoredProfile>,
}

impl ProfileSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a schedule from stored profiles, re-checking their invariants.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] for a repeated id, or
    /// [`RegistryError::Validation`] for a blank username or empty category set.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = MonitoredProfile>,
    ) -> Result<Self, RegistryError> {
        let mut schedule = Self::new();
        for profile in profiles {
            if profile.username.trim().is_empty() {
                return Err(RegistryError::Validation(format!(
                    "profile {} has an empty username",
                    profile.id
                )));
            }
            if profile.categories.is_empty() {
                return Err(RegistryError::Validation(format!(
                    "profile {} tracks no categories",
                    profile.id
                )));
            }
            if schedule.get(profile.id).is_some() {
                return Err(RegistryError::DuplicateId {
                    kind: crate::EntityKind::Profile,
                    id: profile.id.to_string(),
                });
            }
            schedule.profiles.push(profile);
        }
        Ok(schedule)
    }

    /// Start monitoring a profile.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] if the username is blank (after trimming
    /// and stripping a leading `@`) or no category is given.
    pub fn create(&mut self, new: NewProfile) -> Result<MonitoredProfile, RegistryError> {
        let username = normalize_username(&new.username);
        if username.is_empty() {
            tracing::warn!("rejected profile with empty username");
            return Err(RegistryError::Validation(
                "username must be non-empty".to_string(),
            ));
        }
        if new.categories.is_empty() {
            tracing::warn!(%username, "rejected profile with no categories");
            return Err(RegistryError::Validation(format!(
                "profile '{username}' must track at least one category"
            )));
        }

        let profile = MonitoredProfile {
            id: ProfileId::new(),
            username,
            display_name: new.display_name.trim().to_string(),
            status: new.status,
            poll_interval: new.poll_interval.unwrap_or_default(),
            categories: new.categories,
            total_media_collected: 0,
            last_polled_at: None,
            created_at: Utc::now(),
        };

        tracing::info!(
            profile_id = %profile.id,
            username = %profile.username,
            interval = %profile.poll_interval,
            polls_per_day = profile.polls_per_day(),
            "profile created"
        );
        self.profiles.push(profile.clone());
        Ok(profile)
    }

    /// Add the category if absent, remove it if present.
    ///
    /// # Errors
    ///
    /// [`RegistryError::LastCategory`] when removing the profile's only
    /// category (the profile is left unchanged), or
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn toggle_category(
        &mut self,
        id: ProfileId,
        category: Category,
    ) -> Result<CategoryToggle, RegistryError> {
        let profile = self.require_mut(id)?;

        if !profile.categories.contains(&category) {
            profile.categories.insert(category);
            tracing::info!(profile_id = %id, %category, "category added");
            return Ok(CategoryToggle::Added);
        }

        if profile.categories.len() == 1 {
            tracing::warn!(profile_id = %id, %category, "refused to remove last category");
            return Err(RegistryError::LastCategory {
                profile_id: id,
                category,
            });
        }

        profile.categories.remove(&category);
        tracing::info!(profile_id = %id, %category, "category removed");
        Ok(CategoryToggle::Removed)
    }

    /// Set the lifecycle status. Every transition is accepted.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn update_status(
        &mut self,
        id: ProfileId,
        status: ProfileStatus,
    ) -> Result<ProfileStatus, RegistryError> {
        let profile = self.require_mut(id)?;
        let previous = profile.status;
        profile.status = status;
        tracing::info!(profile_id = %id, from = %previous, to = %status, "profile status updated");
        Ok(previous)
    }

    /// Change the polling cadence; `polls_per_day` follows automatically.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn set_poll_interval(
        &mut self,
        id: ProfileId,
        interval: PollInterval,
    ) -> Result<(), RegistryError> {
        let profile = self.require_mut(id)?;
        profile.poll_interval = interval;
        tracing::info!(
            profile_id = %id,
            %interval,
            polls_per_day = interval.polls_per_day(),
            "poll interval updated"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn rename(&mut self, id: ProfileId, display_name: &str) -> Result<(), RegistryError> {
        self.require_mut(id)?.display_name = display_name.trim().to_string();
        tracing::info!(profile_id = %id, "profile renamed");
        Ok(())
    }

    /// Record a completed poll. `last_polled_at` never moves backwards and
    /// the media counter only grows.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn record_poll(
        &mut self,
        id: ProfileId,
        at: DateTime<Utc>,
        media_collected: u64,
    ) -> Result<(), RegistryError> {
        let profile = self.require_mut(id)?;
        profile.last_polled_at = Some(profile.last_polled_at.map_or(at, |last| last.max(at)));
        profile.total_media_collected = profile.total_media_collected.saturating_add(media_collected);
        tracing::debug!(profile_id = %id, media_collected, "poll recorded");
        Ok(())
    }

    /// Stop monitoring a profile. Activity records that reference it are kept.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn delete(&mut self, id: ProfileId) -> Result<MonitoredProfile, RegistryError> {
        let Some(position) = self.profiles.iter().position(|p| p.id == id) else {
            tracing::warn!(profile_id = %id, "profile not found");
            return Err(RegistryError::profile_not_found(id));
        };
        let removed = self.profiles.remove(position);
        tracing::info!(profile_id = %id, username = %removed.username, "profile deleted");
        Ok(removed)
    }

    /// Active profiles owed a poll at `now`: never-polled first, then the
    /// longest-waiting.
    #[must_use]
    pub fn due_profiles(&self, now: DateTime<Utc>) -> Vec<&MonitoredProfile> {
        let mut due: Vec<&MonitoredProfile> = self
            .profiles
            .iter()
            .filter(|p| p.status == ProfileStatus::Active && p.is_due(now))
            .collect();
        due.sort_by_key(|p| p.last_polled_at);
        due
    }

    /// Check each tracked category for a provider that is not offline.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for an unknown id.
    pub fn viability(
        &self,
        id: ProfileId,
        providers: &ProviderRegistry,
    ) -> Result<ScheduleViability, RegistryError> {
        let profile = self
            .get(id)
            .ok_or_else(|| RegistryError::profile_not_found(id))?;

        let uncovered = profile
            .categories
            .iter()
            .copied()
            .filter(|&category| {
                !providers
                    .resolve(category)
                    .iter()
                    .any(|ranked| ranked.provider.health.is_usable())
            })
            .collect();

        Ok(ScheduleViability {
            profile_id: id,
            uncovered,
        })
    }

    /// Case-insensitive match on username or display name, optionally
    /// restricted to one status. An empty term matches everything.
    #[must_use]
    pub fn search(&self, term: &str, status: Option<ProfileStatus>) -> Vec<&MonitoredProfile> {
        let needle = normalize_username(term).to_lowercase();
        self.profiles
            .iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .filter(|p| {
                needle.is_empty()
                    || p.username.to_lowercase().contains(&needle)
                    || p.display_name.to_lowercase().contains(&needle)
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: ProfileId) -> Option<&MonitoredProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitoredProfile> {
        self.profiles.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Seed-only: restore a counter carried over from the seed file.
    pub(crate) fn set_total_media(&mut self, id: ProfileId, total: u64) -> Result<(), RegistryError> {
        self.require_mut(id)?.total_media_collected = total;
        Ok(())
    }

    fn require_mut(&mut self, id: ProfileId) -> Result<&mut MonitoredProfile, RegistryError> {
        self.profiles.iter_mut().find(|p| p.id == id).ok_or_else(|| {
            tracing::warn!(profile_id = %id, "profile not found");
            RegistryError::profile_not_found(id)
        })
    }
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;
