use super::*;
use uuid::Uuid;

fn temp_settings_path() -> PathBuf {
    std::env::temp_dir().join(format!("leadboard-settings-{}.json", Uuid::new_v4()))
}

#[test]
fn memory_settings_round_trip() {
    let settings = MemorySettings::new();
    assert_eq!(settings.get(API_KEY_SETTING), None);
    settings.set(API_KEY_SETTING, "xi-123").unwrap();
    assert_eq!(settings.get(API_KEY_SETTING).as_deref(), Some("xi-123"));
}

#[test]
fn memory_settings_with_api_key_prefills() {
    let settings = MemorySettings::with_api_key("xi-abc");
    assert_eq!(settings.get(API_KEY_SETTING).as_deref(), Some("xi-abc"));
}

#[test]
fn json_file_missing_starts_empty() {
    let path = temp_settings_path();
    let settings = JsonFileSettings::open(&path).unwrap();
    assert_eq!(settings.get(API_KEY_SETTING), None);
    assert!(!path.exists());
}

#[test]
fn json_file_set_persists_across_reopen() {
    let path = temp_settings_path();
    {
        let settings = JsonFileSettings::open(&path).unwrap();
        settings.set(API_KEY_SETTING, "xi-persisted").unwrap();
    }

    let reopened = JsonFileSettings::open(&path).unwrap();
    assert_eq!(reopened.get(API_KEY_SETTING).as_deref(), Some("xi-persisted"));
    assert_eq!(reopened.path(), path.as_path());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn json_file_every_set_rewrites_file() {
    let path = temp_settings_path();
    let settings = JsonFileSettings::open(&path).unwrap();
    settings.set(API_KEY_SETTING, "first").unwrap();
    settings.set(API_KEY_SETTING, "second").unwrap();

    let on_disk: BTreeMap<String, String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.get(API_KEY_SETTING).map(String::as_str), Some("second"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn json_file_invalid_contents_error() {
    let path = temp_settings_path();
    std::fs::write(&path, "not json").unwrap();

    let err = JsonFileSettings::open(&path).unwrap_err();
    assert_eq!(err.error_code(), "E_SETTINGS_JSON");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn json_file_unwritable_path_keeps_previous_value() {
    let dir = std::env::temp_dir().join(format!("leadboard-missing-dir-{}", Uuid::new_v4()));
    let settings = JsonFileSettings::open(dir.join("settings.json")).unwrap();

    let err = settings.set(API_KEY_SETTING, "lost").unwrap_err();
    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(err.retryable());
    assert_eq!(settings.get(API_KEY_SETTING), None);
}
