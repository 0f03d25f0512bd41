use super::*;

const KEYS: [&str; 6] = [
    "LEADS_SEED_COUNT",
    "LEADS_REFRESH_LATENCY_MS",
    "LEADS_SETTINGS_PATH",
    "VOICE_LISTEN_MS",
    "VOICE_PROCESS_MS",
    "VOICE_SPEAK_MS_PER_CHAR",
];

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_config_env() {
    for key in KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

// Env-mutating cases share one test so they cannot race each other.
#[test]
fn from_env_defaults_overrides_and_errors() {
    unsafe { clear_config_env() };
    assert_eq!(AppConfig::from_env().unwrap(), AppConfig::default());

    unsafe {
        std::env::set_var("LEADS_SEED_COUNT", "40");
        std::env::set_var("LEADS_REFRESH_LATENCY_MS", " 250 ");
        std::env::set_var("LEADS_SETTINGS_PATH", "/tmp/leads.json");
        std::env::set_var("VOICE_SPEAK_MS_PER_CHAR", "5");
    }
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.seed_count, 40);
    assert_eq!(cfg.refresh_latency, Duration::from_millis(250));
    assert_eq!(cfg.settings_path, PathBuf::from("/tmp/leads.json"));
    assert_eq!(cfg.voice.speak_per_char, Duration::from_millis(5));
    assert_eq!(cfg.voice.listen, Duration::from_millis(DEFAULT_LISTEN_MS));

    unsafe { std::env::set_var("VOICE_PROCESS_MS", "soon") };
    let err = AppConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::Parse { var: "VOICE_PROCESS_MS".into(), value: "soon".into() });
    assert_eq!(err.error_code(), "E_CONFIG_PARSE");

    unsafe { clear_config_env() };
}

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__LEADBOARD_TEST_MISSING_KEY__", 42).unwrap();
    assert_eq!(val, 42);
}

#[test]
fn env_parse_rejects_negative_for_unsigned() {
    unsafe { std::env::set_var("__LEADBOARD_TEST_NEGATIVE__", "-3") };
    assert!(env_parse::<u64>("__LEADBOARD_TEST_NEGATIVE__", 0).is_err());
    unsafe { std::env::remove_var("__LEADBOARD_TEST_NEGATIVE__") };
}
