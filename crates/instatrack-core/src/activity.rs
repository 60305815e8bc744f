use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profiles::ProfileId;
use crate::providers::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(Uuid);

impl ActivityId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOutcome {
    Success,
    Failure,
    FallbackTriggered,
}

impl std::fmt::Display for ActivityOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityOutcome::Success => write!(f, "success"),
            ActivityOutcome::Failure => write!(f, "failure"),
            ActivityOutcome::FallbackTriggered => write!(f, "fallback_triggered"),
        }
    }
}

/// Outcome of one extraction attempt, as reported by the executor.
///
/// `profile_id` is a weak reference: the record outlives the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub timestamp: DateTime<Utc>,
    pub profile_id: ProfileId,
    /// Free-text label, e.g. `"Extract Stories"`.
    pub action: String,
    pub outcome: ActivityOutcome,
    pub details: String,
    /// Provider that served (or failed) the attempt, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
}

impl ActivityRecord {
    pub fn new(
        profile_id: ProfileId,
        action: impl Into<String>,
        outcome: ActivityOutcome,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            timestamp: Utc::now(),
            profile_id,
            action: action.into(),
            outcome,
            details: details.into(),
            provider_id: None,
        }
    }

    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn via(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }
}
