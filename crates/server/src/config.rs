use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub broadcast_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8085".into(),
            broadcast_capacity: 256,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
                settings.server_bind = v.to_string();
            }
            if let Some(v) = file_cfg
                .get("broadcast_capacity")
                .and_then(toml::Value::as_integer)
            {
                if let Ok(capacity) = usize::try_from(v) {
                    settings.broadcast_capacity = capacity;
                }
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__BROADCAST_CAPACITY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.broadcast_capacity = parsed;
        }
    }

    settings.broadcast_capacity = settings.broadcast_capacity.max(1);
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
