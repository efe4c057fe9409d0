//! Configuration loading and validation tests.

use kizashi_bot::{DedupBackend, KizashiConfig, Platform, PostShape, Provider};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_bundled_defaults_are_valid() {
    let config = KizashiConfig::defaults().unwrap();
    config.validate().unwrap();

    assert_eq!(config.generation.provider, Provider::OpenAi);
    assert_eq!(config.generation.max_retries, 3);
    assert_eq!(config.dedup.backend, DedupBackend::Json);
    assert_eq!(config.publisher.platform, Platform::Demo);
    assert_eq!(config.compose.shape, PostShape::Signal);
    assert_eq!(config.cooldown(), chrono::Duration::hours(3));
    assert_eq!(config.sources.len(), 3);
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[schedule]
interval_minutes = 60
bucket_hours = 2

[compose]
shape = "ranked"
max_length = 300
ellipsis = "..."

[publisher]
platform = "bluesky"
"#
    )
    .unwrap();

    let config = KizashiConfig::from_file(file.path()).unwrap();
    assert_eq!(config.interval(), Duration::from_secs(3600));
    assert_eq!(config.schedule.bucket_hours, 2);
    assert_eq!(config.compose.shape, PostShape::Ranked);
    assert_eq!(config.compose.max_length, Some(300));
    assert_eq!(config.publisher.platform, Platform::Bluesky);
    // Untouched sections keep their defaults.
    assert_eq!(config.selection.top_k, 5);
}

#[test]
fn test_validate_rejects_unusable_settings() {
    let base = KizashiConfig::defaults().unwrap();

    let mut config = base.clone();
    config.selection.top_k = 0;
    assert!(config.validate().unwrap_err().message.contains("top_k"));

    let mut config = base.clone();
    config.generation.max_retries = 0;
    assert!(config.validate().is_err());

    let mut config = base.clone();
    config.sources.clear();
    assert!(config.validate().is_err());

    let mut config = base.clone();
    config.sources[0].themes.clear();
    assert!(config.validate().unwrap_err().message.contains("no themes"));

    let mut config = base;
    config.compose.max_length = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_interval_shorter_than_cooldown_is_allowed() {
    let mut config = KizashiConfig::defaults().unwrap();
    config.schedule.interval_minutes = 30;
    config.dedup.cooldown_hours = 3;
    assert!(config.validate().is_ok());
}

#[test]
fn test_pipeline_settings_follow_config() {
    let mut config = KizashiConfig::defaults().unwrap();
    config.compose.max_length = Some(140);
    config.selection.pause_between_posts_secs = 2;

    let settings = config.pipeline_settings().unwrap();
    assert_eq!(*settings.top_k(), config.selection.top_k);
    assert_eq!(*settings.max_length(), Some(140));
    assert_eq!(*settings.pause_between_posts(), Duration::from_secs(2));
    assert_eq!(settings.ellipsis(), &config.compose.ellipsis);
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(KizashiConfig::load(Some(&missing)).is_err());
}
