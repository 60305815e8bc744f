use chrono::Duration;
use instatrack_core::{HealthStatus, ProviderConfig};

use super::*;

fn schedule_with(new: NewProfile) -> (ProfileSchedule, ProfileId) {
    let mut schedule = ProfileSchedule::new();
    let id = schedule.create(new).unwrap().id;
    (schedule, id)
}

#[test]
fn create_derives_polls_per_day() {
    let (schedule, id) = schedule_with(
        NewProfile::new("marketing_guru", "Marketing Guru Official")
            .poll_interval(PollInterval::Every6Hours),
    );
    let profile = schedule.get(id).unwrap();
    assert_eq!(profile.polls_per_day(), 4);
    assert_eq!(profile.total_media_collected, 0);
    assert!(profile.last_polled_at.is_none());
}

#[test]
fn set_poll_interval_recomputes_polls_per_day() {
    let (mut schedule, id) = schedule_with(
        NewProfile::new("marketing_guru", "Marketing Guru Official")
            .poll_interval(PollInterval::Every6Hours),
    );
    schedule.set_poll_interval(id, PollInterval::Daily).unwrap();
    assert_eq!(schedule.get(id).unwrap().polls_per_day(), 1);
}

#[test]
fn create_without_interval_polls_every_six_hours() {
    let (schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    assert_eq!(schedule.get(id).unwrap().poll_interval, PollInterval::Every6Hours);
}

#[test]
fn default_interval_fills_only_unset_interval() {
    let (schedule, unset) = schedule_with(
        NewProfile::new("marketing_guru", "Marketing").with_default_interval(PollInterval::Daily),
    );
    assert_eq!(schedule.get(unset).unwrap().poll_interval, PollInterval::Daily);

    let (schedule, explicit) = schedule_with(
        NewProfile::new("tech_news_daily", "Tech News")
            .poll_interval(PollInterval::Every3Hours)
            .with_default_interval(PollInterval::Daily),
    );
    assert_eq!(schedule.get(explicit).unwrap().poll_interval, PollInterval::Every3Hours);
}

#[test]
fn create_strips_leading_at() {
    let (schedule, id) = schedule_with(NewProfile::new("  @design_trends ", "Design Daily Trends"));
    assert_eq!(schedule.get(id).unwrap().username, "design_trends");
}

#[test]
fn create_rejects_blank_username() {
    let mut schedule = ProfileSchedule::new();
    let err = schedule.create(NewProfile::new(" @ ", "Nobody")).unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
    assert!(schedule.is_empty());
}

#[test]
fn create_rejects_empty_categories() {
    let mut schedule = ProfileSchedule::new();
    let err = schedule
        .create(NewProfile::new("competitor_hq", "Global Competitors HQ").categories(Vec::<Category>::new()))
        .unwrap_err();
    assert!(err.to_string().contains("at least one category"));
    assert!(schedule.is_empty());
}

#[test]
fn create_keeps_initial_status() {
    let (schedule, id) =
        schedule_with(NewProfile::new("tech_news_daily", "Tech News").status(ProfileStatus::Paused));
    assert_eq!(schedule.get(id).unwrap().status, ProfileStatus::Paused);
}

#[test]
fn toggle_category_adds_then_removes() {
    let (mut schedule, id) = schedule_with(
        NewProfile::new("competitor_hq", "Global Competitors HQ").categories([Category::Permanent]),
    );
    assert_eq!(
        schedule.toggle_category(id, Category::Ephemeral).unwrap(),
        CategoryToggle::Added
    );
    assert!(schedule.get(id).unwrap().tracks(Category::Ephemeral));

    assert_eq!(
        schedule.toggle_category(id, Category::Permanent).unwrap(),
        CategoryToggle::Removed
    );
    let categories: Vec<Category> = schedule.get(id).unwrap().categories.iter().copied().collect();
    assert_eq!(categories, [Category::Ephemeral]);
}

#[test]
fn toggle_last_category_is_rejected_and_leaves_profile_unchanged() {
    let (mut schedule, id) = schedule_with(
        NewProfile::new("design_trends", "Design Daily Trends").categories([Category::Ephemeral]),
    );
    let before = schedule.get(id).unwrap().clone();

    let err = schedule.toggle_category(id, Category::Ephemeral).unwrap_err();
    assert_eq!(
        err,
        RegistryError::LastCategory {
            profile_id: id,
            category: Category::Ephemeral
        }
    );
    assert_eq!(schedule.get(id).unwrap(), &before);
}

#[test]
fn toggle_unknown_profile_is_not_found() {
    let mut schedule = ProfileSchedule::new();
    assert!(matches!(
        schedule.toggle_category(ProfileId::new(), Category::Ephemeral),
        Err(RegistryError::NotFound { .. })
    ));
}

#[test]
fn update_status_accepts_all_transitions() {
    let (mut schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let sequence = [
        ProfileStatus::Paused,
        ProfileStatus::Active,
        ProfileStatus::Error,
        ProfileStatus::Paused,
        ProfileStatus::Error,
        ProfileStatus::Active,
    ];
    let mut expected_previous = ProfileStatus::Active;
    for status in sequence {
        assert_eq!(schedule.update_status(id, status).unwrap(), expected_previous);
        assert_eq!(schedule.get(id).unwrap().status, status);
        expected_previous = status;
    }
}

#[test]
fn record_poll_accumulates_media_and_never_rewinds() {
    let (mut schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let t0 = Utc::now();
    schedule.record_poll(id, t0, 4).unwrap();
    schedule.record_poll(id, t0 - Duration::hours(2), 3).unwrap();
    let profile = schedule.get(id).unwrap();
    assert_eq!(profile.total_media_collected, 7);
    assert_eq!(profile.last_polled_at, Some(t0));
}

#[test]
fn delete_removes_profile() {
    let (mut schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let removed = schedule.delete(id).unwrap();
    assert_eq!(removed.username, "marketing_guru");
    assert!(schedule.get(id).is_none());
    assert!(matches!(schedule.delete(id), Err(RegistryError::NotFound { .. })));
}

#[test]
fn due_profiles_skips_paused_and_recent() {
    let mut schedule = ProfileSchedule::new();
    let now = Utc::now();
    let never = schedule.create(NewProfile::new("never_polled", "A")).unwrap().id;
    let stale = schedule
        .create(NewProfile::new("stale", "B").poll_interval(PollInterval::Hourly))
        .unwrap()
        .id;
    let fresh = schedule
        .create(NewProfile::new("fresh", "C").poll_interval(PollInterval::Daily))
        .unwrap()
        .id;
    let paused = schedule
        .create(NewProfile::new("paused", "D").status(ProfileStatus::Paused))
        .unwrap()
        .id;
    let errored = schedule
        .create(NewProfile::new("errored", "E").status(ProfileStatus::Error))
        .unwrap()
        .id;
    schedule.record_poll(stale, now - Duration::hours(2), 0).unwrap();
    schedule.record_poll(fresh, now - Duration::hours(2), 0).unwrap();

    let due: Vec<ProfileId> = schedule.due_profiles(now).iter().map(|p| p.id).collect();
    assert_eq!(due, [never, stale]);
    assert!(!due.contains(&fresh));
    assert!(!due.contains(&paused));
    assert!(!due.contains(&errored));
}

#[test]
fn viability_reports_categories_without_usable_provider() {
    let mut providers = ProviderRegistry::new();
    providers
        .add(ProviderConfig::new("api-1", "InstaGraph Pro", Category::Ephemeral, "https://a"))
        .unwrap();
    providers
        .add(ProviderConfig::new("api-3", "Official Graph Mock", Category::Permanent, "https://b"))
        .unwrap();
    providers.set_health(&"api-3".into(), HealthStatus::Offline).unwrap();

    let (schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let viability = schedule.viability(id, &providers).unwrap();
    assert!(!viability.is_viable());
    assert_eq!(viability.uncovered, [Category::Permanent]);

    providers.set_health(&"api-3".into(), HealthStatus::Degraded).unwrap();
    assert!(schedule.viability(id, &providers).unwrap().is_viable());
}

#[test]
fn search_matches_username_or_display_name() {
    let mut schedule = ProfileSchedule::new();
    schedule
        .create(NewProfile::new("marketing_guru", "Marketing Guru Official"))
        .unwrap();
    schedule
        .create(NewProfile::new("design_trends", "Design Daily Trends").status(ProfileStatus::Error))
        .unwrap();

    assert_eq!(schedule.search("GURU", None).len(), 1);
    assert_eq!(schedule.search("daily", None).len(), 1);
    assert_eq!(schedule.search("@design", None).len(), 1);
    assert_eq!(schedule.search("", None).len(), 2);
    assert_eq!(schedule.search("", Some(ProfileStatus::Error)).len(), 1);
    assert!(schedule.search("guru", Some(ProfileStatus::Paused)).is_empty());
}

#[test]
fn from_profiles_rejects_empty_categories() {
    let (schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let mut profile = schedule.get(id).unwrap().clone();
    profile.categories.clear();
    assert!(matches!(
        ProfileSchedule::from_profiles([profile]),
        Err(RegistryError::Validation(_))
    ));
}

#[test]
fn from_profiles_rejects_duplicate_id() {
    let (schedule, id) = schedule_with(NewProfile::new("marketing_guru", "Marketing"));
    let profile = schedule.get(id).unwrap().clone();
    assert!(matches!(
        ProfileSchedule::from_profiles([profile.clone(), profile]),
        Err(RegistryError::DuplicateId { .. })
    ));
}
