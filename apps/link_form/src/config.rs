use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

pub const SETTINGS_FILE: &str = "link_form.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_ms: Option<u64>,
    pub non_member_id: Option<String>,
    /// Event a new participant registers for with `create`.
    pub event_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8081/api/v1".into(),
            request_timeout_ms: None,
            non_member_id: None,
            event_id: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat key/value settings file, then environment.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_cfg.get("request_timeout_ms") {
                    apply_timeout(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("non_member_id") {
                    settings.non_member_id = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("event_id") {
                    settings.event_id = Some(v.clone());
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        apply_timeout(&mut settings, &v);
    }

    if let Some(v) = env("APP__NON_MEMBER_ID") {
        settings.non_member_id = Some(v);
    }
    if let Some(v) = env("APP__EVENT_ID") {
        settings.event_id = Some(v);
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings
}

pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(0) => settings.request_timeout_ms = None,
        Ok(ms) => settings.request_timeout_ms = Some(ms),
        Err(_) => warn!(value = raw, "ignoring invalid request timeout"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
