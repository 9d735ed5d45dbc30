use std::path::Path;

/// 把字节数格式化成人类可读的大小，备份列表和字体列表共用。
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 上传入口的扩展名检查（大小写不敏感）。
pub fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_extension(&PathBuf::from("font.WOFF2"), "woff2"));
        assert!(has_extension(&PathBuf::from("dump.zip"), "zip"));
        assert!(!has_extension(&PathBuf::from("recipes.json"), "zip"));
        assert!(!has_extension(&PathBuf::from("noext"), "json"));
    }
}
