use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success, // 用于显示 "备份完成" 或 "保存成功"
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "DONE",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERR ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            time: Local::now().format("%H:%M:%S").to_string(), // 自动生成时间戳
            level,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_carries_message_and_label() {
        let entry = LogEntry::new(LogLevel::Warn, "磁盘空间不足");
        assert_eq!(entry.level.label(), "WARN");
        assert_eq!(entry.message, "磁盘空间不足");
        // HH:MM:SS
        assert_eq!(entry.time.len(), 8);
    }
}
