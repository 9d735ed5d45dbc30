use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub api_token: String,
    pub timeout: u64,
    pub max_retries: u32,
    pub retry_delay: u64,
    pub theme: String,
    pub ui_font: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9000".to_string(),
            api_token: String::new(),
            timeout: 60,
            max_retries: 2,
            retry_delay: 2,
            theme: "dark".to_string(),
            ui_font: String::new(), // 为空则使用目录里的默认字体
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    pub fn load() -> Self {
        if let Ok(content) = fs::read_to_string(Self::config_path()) {
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    pub fn save(&self) {
        if let Ok(data) = serde_json::to_string_pretty(self) {
            let _ = fs::write(Self::config_path(), data);
        }
    }
}
