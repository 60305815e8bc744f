//! Append-only activity log.

use std::sync::Arc;

use instatrack_core::{ActivityOutcome, ActivityRecord, Category, ProfileId};
use serde::{Serialize, Serializer};

use crate::profiles::ProfileSchedule;

/// Criteria for [`ActivityLog::query`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub profile_id: Option<ProfileId>,
    /// Matched through the referenced profile's categories.
    pub category: Option<Category>,
    pub outcome: Option<ActivityOutcome>,
}

impl ActivityFilter {
    #[must_use]
    pub fn for_profile(mut self, id: ProfileId) -> Self {
        self.profile_id = Some(id);
        self
    }

    #[must_use]
    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: ActivityOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fallbacks_triggered: usize,
}

impl ActivitySummary {
    /// Successful extractions as a percentage of successes plus failures.
    ///
    /// `FallbackTriggered` rows record a provider switch after a failure, not
    /// an attempt of their own, so they are left out. `None` when no attempt
    /// has been recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        let attempts = self.succeeded + self.failed;
        if attempts == 0 {
            return None;
        }
        Some(self.succeeded as f64 * 100.0 / attempts as f64)
    }
}

/// Records per sealed chunk.
const CHUNK_LEN: usize = 64;

/// Append-only record sequence.
///
/// Full chunks are sealed behind `Arc` and shared by every clone, so cloning
/// the log copies at most one partial chunk of records.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    sealed: Vec<Arc<[ActivityRecord]>>,
    tail: Vec<ActivityRecord>,
}

impl ActivityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = ActivityRecord>) -> Self {
        let mut log = Self::new();
        for record in records {
            log.push(record);
        }
        log
    }

    /// Entry point for the extraction executor. Records are never edited or
    /// removed afterwards.
    pub fn append(&mut self, record: ActivityRecord) {
        tracing::debug!(
            activity_id = %record.id,
            profile_id = %record.profile_id,
            outcome = %record.outcome,
            "activity recorded"
        );
        self.push(record);
    }

    fn push(&mut self, record: ActivityRecord) {
        self.tail.push(record);
        if self.tail.len() == CHUNK_LEN {
            let chunk: Arc<[ActivityRecord]> = std::mem::take(&mut self.tail).into();
            self.sealed.push(chunk);
        }
    }

    /// Records matching `filter`, oldest first.
    ///
    /// A category filter drops records whose profile no longer exists.
    #[must_use]
    pub fn query<'a>(
        &'a self,
        filter: &ActivityFilter,
        profiles: &ProfileSchedule,
    ) -> Vec<&'a ActivityRecord> {
        self.iter()
            .filter(|r| filter.profile_id.is_none_or(|id| r.profile_id == id))
            .filter(|r| filter.outcome.is_none_or(|o| r.outcome == o))
            .filter(|r| {
                filter.category.is_none_or(|category| {
                    profiles
                        .get(r.profile_id)
                        .is_some_and(|p| p.tracks(category))
                })
            })
            .collect()
    }

    /// Records whose profile has been deleted.
    #[must_use]
    pub fn stale<'a>(&'a self, profiles: &ProfileSchedule) -> Vec<&'a ActivityRecord> {
        self.iter()
            .filter(|r| profiles.get(r.profile_id).is_none())
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> ActivitySummary {
        self.iter()
            .fold(ActivitySummary::default(), |mut acc, record| {
                acc.total += 1;
                match record.outcome {
                    ActivityOutcome::Success => acc.succeeded += 1,
                    ActivityOutcome::Failure => acc.failed += 1,
                    ActivityOutcome::FallbackTriggered => acc.fallbacks_triggered += 1,
                }
                acc
            })
    }

    /// All records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.sealed
            .iter()
            .flat_map(|chunk| chunk.iter())
            .chain(self.tail.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sealed.len() * CHUNK_LEN + self.tail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sealed.is_empty() && self.tail.is_empty()
    }
}

impl PartialEq for ActivityLog {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for ActivityLog {}

impl Serialize for ActivityLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
