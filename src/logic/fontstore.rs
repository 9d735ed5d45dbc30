//! 自定义字体仓库：用户上传的 WOFF2 文件落在本地数据目录里。
//!
//! 每条记录以字体名为主键，落盘为一个元数据 JSON 加一个 .woff2 负载文件。
//! 字体名允许任意字符，文件名用 URL-safe base64 编码后的名字，避免非法路径。
//! 所有操作都是一次性的本地事务：校验失败不落盘，I/O 错误原样向上传递，
//! 不做重试。

use crate::log_warn;
use crate::utils::format_bytes;
use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::fs;

/// 超过该大小仅提示，不拒绝写入。
pub const SIZE_WARN_THRESHOLD: usize = 500 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct CustomFontRecord {
    pub name: String,
    pub data: Vec<u8>,
    /// 像素字号，形如 "16px"
    pub size: String,
    /// 行高倍数，[0.5, 3.0]
    pub line_height: f32,
    /// RFC 3339，由仓库在写入时填充
    pub uploaded_at: String,
}

impl CustomFontRecord {
    pub fn new(name: impl Into<String>, data: Vec<u8>, size: impl Into<String>, line_height: f32) -> Self {
        Self {
            name: name.into(),
            data,
            size: size.into(),
            line_height,
            uploaded_at: String::new(),
        }
    }
}

/// 落盘的元数据部分，负载单独存文件。
#[derive(Debug, Serialize, Deserialize)]
struct FontMeta {
    name: String,
    size: String,
    line_height: f32,
    uploaded_at: String,
}

fn size_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+px$").unwrap())
}

pub struct FontStore {
    root: PathBuf,
}

impl FontStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 平台数据目录下的默认存储位置。
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recipe_settings")
            .join("fonts")
    }

    fn file_stem(name: &str) -> String {
        URL_SAFE_NO_PAD.encode(name.as_bytes())
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::file_stem(name)))
    }

    fn data_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.woff2", Self::file_stem(name)))
    }

    /// 按顺序校验，每条规则给出独立的错误信息；任何一条失败都不会落盘。
    fn validate(record: &CustomFontRecord) -> Result<()> {
        if record.name.trim().is_empty() {
            bail!("字体名称不能为空");
        }
        if record.data.is_empty() {
            bail!("字体内容为空，不是有效的二进制文件");
        }
        let px: u64 = record
            .size
            .strip_suffix("px")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if !size_pattern().is_match(&record.size) || px == 0 {
            bail!("字号格式非法，应为正整数像素值，例如 16px");
        }
        if !(0.5..=3.0).contains(&record.line_height) {
            bail!("行高超出范围，应在 0.5 到 3.0 之间");
        }
        Ok(())
    }

    /// 校验后按名字 upsert；同名记录直接覆盖。
    pub async fn save(&self, record: &CustomFontRecord) -> Result<()> {
        Self::validate(record)?;

        if record.data.len() > SIZE_WARN_THRESHOLD {
            log::warn!("font {} exceeds the 500 KiB advisory threshold", record.name);
            log_warn!(
                "字体 [{}] 大小 {}，超过 500KB，网页端首次加载可能偏慢",
                record.name,
                format_bytes(record.data.len() as u64)
            );
        }

        fs::create_dir_all(&self.root)
            .await
            .context("创建字体存储目录失败")?;

        let meta = FontMeta {
            name: record.name.clone(),
            size: record.size.clone(),
            line_height: record.line_height,
            uploaded_at: Utc::now().to_rfc3339(),
        };

        fs::write(self.data_path(&record.name), &record.data)
            .await
            .context("写入字体文件失败")?;
        fs::write(self.meta_path(&record.name), serde_json::to_string_pretty(&meta)?)
            .await
            .context("写入字体元数据失败")?;
        Ok(())
    }

    /// 精确按名字查找；不存在返回 None，不算错误。
    pub async fn get(&self, name: &str) -> Result<Option<CustomFontRecord>> {
        let content = match fs::read_to_string(self.meta_path(name)).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("读取字体元数据失败"),
        };
        let meta: FontMeta = serde_json::from_str(&content).context("字体元数据损坏")?;
        let data = fs::read(self.data_path(name))
            .await
            .context("读取字体文件失败")?;

        Ok(Some(CustomFontRecord {
            name: meta.name,
            data,
            size: meta.size,
            line_height: meta.line_height,
            uploaded_at: meta.uploaded_at,
        }))
    }

    /// 返回全部记录，顺序不保证；需要稳定顺序的调用方自行排序。
    pub async fn list(&self) -> Result<Vec<CustomFontRecord>> {
        let mut out = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(e) => e,
            // 目录还没建过，等价于空仓库
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e).context("读取字体存储目录失败"),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            let meta: FontMeta = serde_json::from_str(&content).context("字体元数据损坏")?;
            if let Some(record) = self.get(&meta.name).await? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// 幂等删除：返回 true 表示确实删掉了一条记录，false 表示本来就不存在。
    pub async fn delete(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.meta_path(name)).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e).context("删除字体元数据失败"),
        }
        match fs::remove_file(self.data_path(name)).await {
            Ok(_) => {}
            // 元数据在而负载丢了，同样视作删除完成
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("删除字体文件失败"),
        }
        Ok(true)
    }
}

/// 把负载编码成可直接内嵌到样式里的 data URL，不经过文件系统。
pub fn to_data_url(record: &CustomFontRecord) -> String {
    format!("data:font/woff2;base64,{}", STANDARD.encode(&record.data))
}

/// 生成可直接下发给网页端的 @font-face 声明。
/// font-display: swap 保证字体加载期间文字不被阻塞。
pub fn to_font_face_rule(record: &CustomFontRecord) -> String {
    format!(
        "@font-face {{\n  font-family: '{}';\n  src: url({}) format('woff2');\n  font-display: swap;\n}}\n",
        record.name,
        to_data_url(record)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> FontStore {
        let root = std::env::temp_dir().join(format!(
            "recipe_settings_fontstore_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        FontStore::new(root)
    }

    fn pico() -> CustomFontRecord {
        CustomFontRecord::new("Pico", vec![7u8; 1024], "14px", 1.2)
    }

    #[tokio::test]
    async fn save_then_get_round_trips_with_timestamp() {
        let store = temp_store("roundtrip");
        store.save(&pico()).await.unwrap();

        let loaded = store.get("Pico").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Pico");
        assert_eq!(loaded.data, vec![7u8; 1024]);
        assert_eq!(loaded.size, "14px");
        assert_eq!(loaded.line_height, 1.2);
        // 仓库写入时补上 RFC 3339 时间戳
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.uploaded_at).is_ok());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = temp_store("upsert");
        store.save(&pico()).await.unwrap();
        store.save(&pico()).await.unwrap();

        let mut second = pico();
        second.data = vec![9u8; 64];
        second.size = "20px".to_string();
        store.save(&second).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].size, "20px");
        assert_eq!(all[0].data.len(), 64);
    }

    #[tokio::test]
    async fn delete_distinguishes_present_from_absent() {
        let store = temp_store("delete");
        assert!(!store.delete("Pico").await.unwrap());

        store.save(&pico()).await.unwrap();
        assert!(store.delete("Pico").await.unwrap());
        assert!(store.get("Pico").await.unwrap().is_none());
        assert!(!store.delete("Pico").await.unwrap());
    }

    #[tokio::test]
    async fn save_rejects_empty_name() {
        let store = temp_store("bad_name");
        let mut record = pico();
        record.name = "  ".to_string();
        let err = store.save(&record).await.unwrap_err();
        assert!(err.to_string().contains("名称"));
    }

    #[tokio::test]
    async fn save_rejects_empty_payload() {
        let store = temp_store("bad_payload");
        let mut record = pico();
        record.data.clear();
        let err = store.save(&record).await.unwrap_err();
        assert!(err.to_string().contains("二进制"));
    }

    #[tokio::test]
    async fn save_rejects_malformed_size() {
        let store = temp_store("bad_size");
        for bad in ["14", "14 px", "px", "1.5px", "0px"] {
            let mut record = pico();
            record.size = bad.to_string();
            let err = store.save(&record).await.unwrap_err();
            assert!(err.to_string().contains("字号"), "{bad} 应被拒绝");
        }
    }

    #[tokio::test]
    async fn save_rejects_line_height_out_of_range() {
        let store = temp_store("bad_lh");
        for bad in [0.4f32, 3.1, -1.0] {
            let mut record = pico();
            record.line_height = bad;
            let err = store.save(&record).await.unwrap_err();
            assert!(err.to_string().contains("行高"), "{bad} 应被拒绝");
        }
    }

    #[tokio::test]
    async fn oversized_payload_still_saves() {
        let store = temp_store("oversized");
        let record = CustomFontRecord::new("大字体", vec![1u8; 600 * 1024], "16px", 1.5);
        store.save(&record).await.unwrap();
        assert!(store.get("大字体").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_returns_all_records_with_correct_lengths() {
        let store = temp_store("list");
        store.save(&pico()).await.unwrap();
        store
            .save(&CustomFontRecord::new("汤圆手写体", vec![3u8; 2000], "18px", 1.7))
            .await
            .unwrap();

        let mut all = store.list().await.unwrap();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Pico");
        assert_eq!(all[0].data.len(), 1024);
        assert_eq!(all[1].name, "汤圆手写体");
        assert_eq!(all[1].data.len(), 2000);
    }

    #[test]
    fn data_url_round_trips_payload() {
        let record = CustomFontRecord::new("Mini", vec![1, 2, 3, 4, 5], "12px", 1.0);
        let url = to_data_url(&record);
        assert!(url.starts_with("data:font/woff2;base64,"));

        let encoded = url.trim_start_matches("data:font/woff2;base64,");
        assert_eq!(STANDARD.decode(encoded).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn font_face_rule_embeds_name_and_swap() {
        let record = CustomFontRecord::new("Pico", vec![1, 2, 3], "14px", 1.2);
        let rule = to_font_face_rule(&record);
        assert!(rule.starts_with("@font-face {"));
        assert!(rule.contains("font-family: 'Pico';"));
        assert!(rule.contains("format('woff2')"));
        assert!(rule.contains("font-display: swap;"));
        assert!(rule.contains(&to_data_url(&record)));
    }

    #[test]
    fn filenames_survive_unsafe_names() {
        let store = FontStore::new(PathBuf::from("/tmp/x"));
        let path = store.meta_path("奇怪/的:名字 v2");
        let stem = path.file_stem().unwrap().to_string_lossy();
        assert!(!stem.contains('/') && !stem.contains(':') && !stem.contains(' '));
    }
}
