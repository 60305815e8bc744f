use std::path::Path;

use super::*;

fn provider(id: &str) -> ProviderSeed {
    ProviderSeed {
        id: id.to_string(),
        name: "InstaGraph Pro".to_string(),
        category: Category::Ephemeral,
        endpoint: "https://api.instagraph.pro/v1".to_string(),
        health: HealthStatus::Online,
        success_rate: 98.5,
        total_requests: 0,
    }
}

fn profile(username: &str) -> ProfileSeed {
    ProfileSeed {
        username: username.to_string(),
        display_name: "Marketing Guru Official".to_string(),
        status: ProfileStatus::Active,
        poll_interval: Some(PollInterval::Every6Hours),
        categories: vec![Category::Ephemeral],
        total_media_collected: 0,
    }
}

#[test]
fn validate_accepts_valid_seed() {
    let seed = SeedFile {
        providers: vec![provider("api-1"), provider("api-2")],
        profiles: vec![profile("marketing_guru"), profile("competitor_hq")],
    };
    assert!(validate_seed(&seed).is_ok());
}

#[test]
fn validate_rejects_duplicate_provider_id() {
    let seed = SeedFile {
        providers: vec![provider("api-1"), provider("api-1")],
        profiles: vec![],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("duplicate provider id"));
}

#[test]
fn validate_rejects_blank_provider_id() {
    let seed = SeedFile {
        providers: vec![provider("  ")],
        profiles: vec![],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_blank_endpoint() {
    let mut p = provider("api-1");
    p.endpoint = String::new();
    let seed = SeedFile {
        providers: vec![p],
        profiles: vec![],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("endpoint"));
}

#[test]
fn validate_rejects_success_rate_out_of_range() {
    let mut p = provider("api-1");
    p.success_rate = 101.0;
    let seed = SeedFile {
        providers: vec![p],
        profiles: vec![],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("success rate"));
}

#[test]
fn validate_rejects_profile_without_categories() {
    let mut p = profile("marketing_guru");
    p.categories.clear();
    let seed = SeedFile {
        providers: vec![],
        profiles: vec![p],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("at least one category"));
}

#[test]
fn validate_rejects_blank_username() {
    let seed = SeedFile {
        providers: vec![],
        profiles: vec![profile(" @ ")],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_username_ignoring_at_and_case() {
    let seed = SeedFile {
        providers: vec![],
        profiles: vec![profile("Design_Trends"), profile("@design_trends")],
    };
    let err = validate_seed(&seed).unwrap_err();
    assert!(err.to_string().contains("duplicate profile username"));
}

#[test]
fn parse_seed_applies_defaults() {
    let yaml = r"
providers:
  - id: api-9
    name: Backup
    category: permanent
    endpoint: http://backup:3000
profiles:
  - username: '@someone'
    display_name: Someone
    categories: [permanent]
";
    let seed = parse_seed(yaml).unwrap();
    let provider = &seed.providers[0];
    assert_eq!(provider.health, HealthStatus::Online);
    assert!((provider.success_rate - 100.0).abs() < f64::EPSILON);
    assert_eq!(provider.total_requests, 0);
    let profile = &seed.profiles[0];
    assert_eq!(profile.status, ProfileStatus::Active);
    assert_eq!(profile.poll_interval, None);
}

#[test]
fn parse_seed_reads_explicit_interval() {
    let yaml = r"
profiles:
  - username: tech_news_daily
    display_name: Tech News
    poll_interval_hours: 3
    categories: [ephemeral]
";
    let seed = parse_seed(yaml).unwrap();
    assert_eq!(seed.profiles[0].poll_interval, Some(PollInterval::Every3Hours));
}

#[test]
fn parse_seed_rejects_off_menu_interval() {
    let yaml = r"
profiles:
  - username: someone
    display_name: Someone
    poll_interval_hours: 5
    categories: [ephemeral]
";
    assert!(matches!(
        parse_seed(yaml),
        Err(ConfigError::SeedFileParse(_))
    ));
}

#[test]
fn into_config_carries_every_field() {
    let config = provider("api-1").into_config();
    assert_eq!(config.id.as_str(), "api-1");
    assert_eq!(config.category, Category::Ephemeral);
    assert!((config.success_rate - 98.5).abs() < f64::EPSILON);
}

#[test]
fn load_seed_reports_missing_file() {
    let err = load_seed(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SeedFileIo { .. }));
}

#[test]
fn load_seed_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("tracker.yaml");
    assert!(
        path.exists(),
        "tracker.yaml missing at {path:?}; required for this test"
    );
    let result = load_seed(&path);
    assert!(result.is_ok(), "failed to load tracker.yaml: {result:?}");
    let seed = result.unwrap();
    assert_eq!(seed.providers.len(), 4);
    assert_eq!(seed.profiles.len(), 4);
}
