//! 远程 Recipe Manager 服务端的数据结构，字段名与 Web 端 JSON 保持 camelCase。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const WEEKDAY_LABELS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub notifications_enabled: bool,
    /// 每日提醒时间，形如 "18:30"
    pub notify_time: String,
    /// 周一到周日
    pub notify_days: [bool; 7],
    #[serde(default)]
    pub webhook_url: String,
    pub theme: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: false,
            notify_time: "18:00".to_string(),
            notify_days: [true; 7],
            webhook_url: String::new(),
            theme: "light".to_string(),
        }
    }
}

/// 提醒时间必须是 24 小时制 HH:MM。
pub fn validate_notify_time(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap())
        .is_match(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    pub size: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordStatus {
    pub connected: bool,
    #[serde(default)]
    pub bot_user: Option<String>,
    #[serde(default)]
    pub guild_count: u32,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_deserialize_from_server_json() {
        let raw = r#"{
            "notificationsEnabled": true,
            "notifyTime": "09:15",
            "notifyDays": [true, true, true, true, true, false, false],
            "webhookUrl": "https://discord.com/api/webhooks/1/abc",
            "theme": "dark"
        }"#;
        let settings: ServerSettings = serde_json::from_str(raw).unwrap();
        assert!(settings.notifications_enabled);
        assert_eq!(settings.notify_time, "09:15");
        assert!(!settings.notify_days[5]);
        assert_eq!(settings.theme, "dark");
    }

    #[test]
    fn notify_time_validation() {
        for ok in ["00:00", "09:15", "23:59"] {
            assert!(validate_notify_time(ok), "{ok} 应当合法");
        }
        for bad in ["24:00", "9:15", "12:60", "midnight", ""] {
            assert!(!validate_notify_time(bad), "{bad} 应当非法");
        }
    }

    #[test]
    fn discord_status_tolerates_missing_fields() {
        let status: DiscordStatus = serde_json::from_str(r#"{"connected": false}"#).unwrap();
        assert!(!status.connected);
        assert_eq!(status.guild_count, 0);
        assert!(status.bot_user.is_none());
    }
}
