use aerogen::{PreferenceStore, Theme};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::open(dir.path().join("preferences.json"));

    assert_eq!(store.theme(), Theme::Light);
    assert!(store.saved_jobs().is_empty());
}

#[test]
fn theme_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.json");

    let mut store = PreferenceStore::open(&path);
    assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);

    let reopened = PreferenceStore::open(&path);
    assert_eq!(reopened.theme(), Theme::Dark);
}

#[test]
fn saved_jobs_toggle_and_keep_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let mut store = PreferenceStore::open(&path);
    assert!(store.toggle_saved_job("uav-pilot").unwrap());
    assert!(store.toggle_saved_job("systems-engineer").unwrap());
    assert!(store.toggle_saved_job("field-technician").unwrap());
    assert!(!store.toggle_saved_job("systems-engineer").unwrap());

    let reopened = PreferenceStore::open(&path);
    assert_eq!(reopened.saved_jobs(), ["uav-pilot", "field-technician"]);
    assert!(reopened.is_job_saved("uav-pilot"));
    assert!(!reopened.is_job_saved("systems-engineer"));
}

#[test]
fn file_uses_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let mut store = PreferenceStore::open(&path);
    store.set_theme(Theme::Dark).unwrap();
    store.toggle_saved_job("uav-pilot").unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["theme"], "dark");
    assert_eq!(raw["savedJobs"], serde_json::json!(["uav-pilot"]));
}

#[test]
fn corrupt_file_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = PreferenceStore::open(&path);
    assert_eq!(store.theme(), Theme::Light);

    store.set_theme(Theme::Dark).unwrap();
    assert_eq!(PreferenceStore::open(&path).theme(), Theme::Dark);
}

#[test]
fn unknown_keys_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, r#"{"theme":"light","cookieConsent":true}"#).unwrap();

    let mut store = PreferenceStore::open(&path);
    store.toggle_theme().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["theme"], "dark");
    assert_eq!(raw["cookieConsent"], true);
}
