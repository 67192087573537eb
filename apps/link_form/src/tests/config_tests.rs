use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_settings_file(tag: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("link_form_settings_{tag}_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/link_form.toml"), no_env);

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        "file",
        r#"
api_base_url = "https://api.example.com/api/v1/"
request_timeout_ms = "2500"
non_member_id = "nm-7"
"#,
    );

    let settings = load_settings_from(&path, no_env);

    assert_eq!(settings.api_base_url, "https://api.example.com/api/v1");
    assert_eq!(settings.request_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(settings.non_member_id.as_deref(), Some("nm-7"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn environment_wins_over_file() {
    let path = temp_settings_file("env", r#"api_base_url = "https://file.example.com""#);

    let settings = load_settings_from(&path, |key| match key {
        "API_BASE_URL" => Some("https://plain.example.com".to_string()),
        "APP__API_BASE_URL" => Some("https://app.example.com".to_string()),
        "APP__REQUEST_TIMEOUT_MS" => Some("900".to_string()),
        _ => None,
    });

    assert_eq!(settings.api_base_url, "https://app.example.com");
    assert_eq!(settings.request_timeout_ms, Some(900));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn event_id_comes_from_file_then_environment() {
    let path = temp_settings_file("event", r#"event_id = "event-from-file""#);

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.event_id.as_deref(), Some("event-from-file"));

    let settings = load_settings_from(&path, |key| {
        (key == "APP__EVENT_ID").then(|| "event-from-env".to_string())
    });
    assert_eq!(settings.event_id.as_deref(), Some("event-from-env"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_or_zero_timeout_means_no_timeout() {
    let settings = load_settings_from(Path::new("/nonexistent/link_form.toml"), |key| {
        (key == "APP__REQUEST_TIMEOUT_MS").then(|| "soon".to_string())
    });
    assert_eq!(settings.request_timeout_ms, None);

    let settings = load_settings_from(Path::new("/nonexistent/link_form.toml"), |key| {
        (key == "APP__REQUEST_TIMEOUT_MS").then(|| "0".to_string())
    });
    assert_eq!(settings.request_timeout_ms, None);
}

#[test]
fn unparseable_file_is_ignored() {
    let path = temp_settings_file("garbled", "api_base_url = [not, a, string");

    let settings = load_settings_from(&path, no_env);

    assert_eq!(settings, Settings::default());
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn blank_base_url_falls_back_to_default() {
    assert_eq!(normalize_base_url("   "), Settings::default().api_base_url);
    assert_eq!(normalize_base_url(" http://host:1/// "), "http://host:1");
}
