//! Settings file persistence.

use std::path::PathBuf;

use enrollment_cli::settings::{Settings, load_settings_from, save_settings_to};

#[test]
fn saved_settings_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("settings.toml");

    let mut settings = Settings::default();
    settings.redcap.api_key = Some("TOKEN".to_string());
    settings.redcap.record_id_field = "participant_id".to_string();
    settings.export.directory = Some(PathBuf::from("/srv/reports"));
    save_settings_to(&settings, &path).unwrap();

    assert_eq!(load_settings_from(&path), settings);
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_settings_from(&dir.path().join("absent.toml"));
    assert_eq!(loaded, Settings::default());
}

#[test]
fn unparseable_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "redcap = [not toml").unwrap();
    assert_eq!(load_settings_from(&path), Settings::default());
}

#[test]
fn default_file_is_minimal() {
    let text = toml::to_string_pretty(&Settings::default()).unwrap();
    assert!(text.contains("api_url = \"https://redcap.ahc.umn.edu/api/\""));
    assert!(text.contains("record_id_field = \"record_id\""));
    assert!(!text.contains("api_key"));
}
