//! In-memory registries behind the extraction dashboard: per-category
//! provider fallback chains, the profile polling schedule, and the
//! append-only activity log.

pub mod activity;
pub mod policy;
pub mod profiles;
pub mod providers;
pub mod snapshot;
pub mod state;

pub use activity::{ActivityFilter, ActivityLog, ActivitySummary};
pub use policy::select_provider;
pub use profiles::{CategoryToggle, NewProfile, ProfileSchedule, ScheduleViability};
pub use providers::{FallbackChain, MoveOutcome, ProviderEdit, ProviderRegistry, RankedProvider};
pub use snapshot::{load_snapshot, save_snapshot, DashboardStats, Snapshot, SnapshotError};
pub use state::TrackerState;

use instatrack_core::{Category, ProfileId};
use thiserror::Error;

/// Which registry an id belongs to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Provider,
    Profile,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Provider => write!(f, "provider"),
            EntityKind::Profile => write!(f, "profile"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("profile {profile_id} must track at least one category; cannot remove {category}")]
    LastCategory {
        profile_id: ProfileId,
        category: Category,
    },

    #[error("registry lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    pub(crate) fn provider_not_found(id: impl std::fmt::Display) -> Self {
        RegistryError::NotFound {
            kind: EntityKind::Provider,
            id: id.to_string(),
        }
    }

    pub(crate) fn profile_not_found(id: ProfileId) -> Self {
        RegistryError::NotFound {
            kind: EntityKind::Profile,
            id: id.to_string(),
        }
    }
}
