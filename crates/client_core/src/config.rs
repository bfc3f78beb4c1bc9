use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::store::DuplicatePolicy;

pub const SETTINGS_FILE: &str = "inbox.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub duplicate_policy: DuplicatePolicy,
    pub event_queue_capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8085".into(),
            duplicate_policy: DuplicatePolicy::Keep,
            event_queue_capacity: 256,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server_url: Option<String>,
    duplicate_policy: Option<DuplicatePolicy>,
    event_queue_capacity: Option<usize>,
}

/// Defaults, then `inbox.toml` in the working directory if present, then environment.
pub fn load_settings() -> ClientSettings {
    let path = Path::new(SETTINGS_FILE);
    let file = if path.exists() {
        match read_settings_file(path) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "config: ignoring unreadable settings file");
                None
            }
        }
    } else {
        None
    };
    resolve_settings(file, |key| std::env::var(key).ok())
}

/// Like [`load_settings`] with an explicit file that must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<ClientSettings> {
    let file = read_settings_file(path)?;
    Ok(resolve_settings(Some(file), |key| std::env::var(key).ok()))
}

fn read_settings_file(path: &Path) -> anyhow::Result<SettingsFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn resolve_settings(
    file: Option<SettingsFile>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(file) = file {
        if let Some(v) = file.server_url {
            settings.server_url = v;
        }
        if let Some(v) = file.duplicate_policy {
            settings.duplicate_policy = v;
        }
        if let Some(v) = file.event_queue_capacity {
            settings.event_queue_capacity = v;
        }
    }

    if let Some(v) = env("INBOX_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("INBOX_DUPLICATE_POLICY") {
        match v.parse() {
            Ok(policy) => settings.duplicate_policy = policy,
            Err(err) => warn!(%err, "config: ignoring INBOX_DUPLICATE_POLICY"),
        }
    }

    if let Some(v) = env("INBOX_EVENT_QUEUE_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.event_queue_capacity = parsed;
        }
    }

    settings.event_queue_capacity = settings.event_queue_capacity.max(1);
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
