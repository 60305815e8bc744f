use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProfileId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a monitored profile.
///
/// `Error` is entered when an extraction fails and is left only through an
/// explicit status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Paused,
    Error,
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileStatus::Active => write!(f, "active"),
            ProfileStatus::Paused => write!(f, "paused"),
            ProfileStatus::Error => write!(f, "error"),
        }
    }
}

/// Operator-facing polling cadence ("every N hours").
///
/// Serialized as the number of hours.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum PollInterval {
    Hourly,
    Every3Hours,
    #[default]
    Every6Hours,
    TwiceDaily,
    Daily,
}

impl PollInterval {
    pub const MENU: [PollInterval; 5] = [
        PollInterval::Hourly,
        PollInterval::Every3Hours,
        PollInterval::Every6Hours,
        PollInterval::TwiceDaily,
        PollInterval::Daily,
    ];

    #[must_use]
    pub fn hours(self) -> u8 {
        match self {
            PollInterval::Hourly => 1,
            PollInterval::Every3Hours => 3,
            PollInterval::Every6Hours => 6,
            PollInterval::TwiceDaily => 12,
            PollInterval::Daily => 24,
        }
    }

    /// `round(24 / hours)`.
    #[must_use]
    pub fn polls_per_day(self) -> u32 {
        let hours = u32::from(self.hours());
        (24 + hours / 2) / hours
    }

    /// Minimum time between two polls: `24h / polls_per_day`.
    #[must_use]
    pub fn period(self) -> Duration {
        Duration::minutes(24 * 60 / i64::from(self.polls_per_day()))
    }
}

impl TryFrom<u8> for PollInterval {
    type Error = String;

    fn try_from(hours: u8) -> Result<Self, Self::Error> {
        PollInterval::MENU
            .into_iter()
            .find(|interval| interval.hours() == hours)
            .ok_or_else(|| format!("poll interval must be one of 1, 3, 6, 12, 24 hours; got {hours}"))
    }
}

impl From<PollInterval> for u8 {
    fn from(interval: PollInterval) -> Self {
        interval.hours()
    }
}

impl std::fmt::Display for PollInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "every {}h", self.hours())
    }
}

/// A social account whose content is extracted on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredProfile {
    pub id: ProfileId,
    /// Handle without the leading `@`. Immutable once created.
    pub username: String,
    pub display_name: String,
    pub status: ProfileStatus,
    pub poll_interval: PollInterval,
    /// Never empty.
    pub categories: BTreeSet<Category>,
    pub total_media_collected: u64,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MonitoredProfile {
    /// Times per day the profile is polled, derived from `poll_interval`.
    #[must_use]
    pub fn polls_per_day(&self) -> u32 {
        self.poll_interval.polls_per_day()
    }

    #[must_use]
    pub fn tracks(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Whether a poll is owed at `now`. A profile that was never polled is
    /// always due. Status is not considered here.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_polled_at {
            None => true,
            Some(last) => now - last >= self.poll_interval.period(),
        }
    }

    /// When the next poll becomes due, or `None` if the profile was never polled.
    #[must_use]
    pub fn next_poll_at(&self) -> Option<DateTime<Utc>> {
        self.last_polled_at
            .map(|last| last + self.poll_interval.period())
    }
}

/// Trims the handle and strips a single leading `@`.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(interval: PollInterval, last: Option<DateTime<Utc>>) -> MonitoredProfile {
        MonitoredProfile {
            id: ProfileId::new(),
            username: "marketing_guru".to_string(),
            display_name: "Marketing Guru Official".to_string(),
            status: ProfileStatus::Active,
            poll_interval: interval,
            categories: BTreeSet::from([Category::Ephemeral]),
            total_media_collected: 0,
            last_polled_at: last,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn polls_per_day_matches_rounded_division() {
        for interval in PollInterval::MENU {
            let expected = (24.0 / f64::from(interval.hours())).round() as u32;
            assert_eq!(interval.polls_per_day(), expected, "{interval}");
        }
    }

    #[test]
    fn menu_values_map_to_expected_frequencies() {
        assert_eq!(PollInterval::Hourly.polls_per_day(), 24);
        assert_eq!(PollInterval::Every3Hours.polls_per_day(), 8);
        assert_eq!(PollInterval::Every6Hours.polls_per_day(), 4);
        assert_eq!(PollInterval::TwiceDaily.polls_per_day(), 2);
        assert_eq!(PollInterval::Daily.polls_per_day(), 1);
    }

    #[test]
    fn try_from_rejects_off_menu_hours() {
        assert_eq!(PollInterval::try_from(6), Ok(PollInterval::Every6Hours));
        let err = PollInterval::try_from(5).unwrap_err();
        assert!(err.contains("got 5"));
    }

    #[test]
    fn poll_interval_serializes_as_hours() {
        let json = serde_json::to_string(&PollInterval::TwiceDaily).unwrap();
        assert_eq!(json, "12");
        let parsed: PollInterval = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, PollInterval::Every3Hours);
        assert!(serde_json::from_str::<PollInterval>("7").is_err());
    }

    #[test]
    fn never_polled_profile_is_due() {
        let p = profile(PollInterval::Daily, None);
        assert!(p.is_due(Utc::now()));
        assert!(p.next_poll_at().is_none());
    }

    #[test]
    fn profile_is_due_once_period_has_elapsed() {
        let last = Utc::now();
        let p = profile(PollInterval::Every6Hours, Some(last));
        assert!(!p.is_due(last + Duration::hours(5)));
        assert!(p.is_due(last + Duration::hours(6)));
        assert_eq!(p.next_poll_at(), Some(last + Duration::hours(6)));
    }

    #[test]
    fn normalize_username_strips_at_and_whitespace() {
        assert_eq!(normalize_username("  @design_trends "), "design_trends");
        assert_eq!(normalize_username("tech_news_daily"), "tech_news_daily");
        assert_eq!(normalize_username("@"), "");
    }
}
