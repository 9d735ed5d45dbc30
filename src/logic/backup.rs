use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use zip::ZipArchive;

/// 上传前在本地检查备份包：能打开、每个条目可读才放行，返回条目数。
pub fn inspect_archive(path: &Path) -> Result<usize> {
    let file = fs::File::open(path).context("打开备份文件失败")?;
    let mut archive = ZipArchive::new(file).context("备份文件不是有效的 zip 包")?;

    if archive.len() == 0 {
        bail!("备份包是空的");
    }

    for i in 0..archive.len() {
        archive
            .by_index(i)
            .with_context(|| format!("备份包第 {} 个条目损坏", i + 1))?;
    }

    Ok(archive.len())
}

/// 把下载到的数据库备份写到用户选择的位置。
pub fn write_download(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes).context("写入备份文件失败")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("recipe_settings_backup_{}_{}", name, std::process::id()))
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn inspect_counts_entries_of_valid_archive() {
        let path = temp_path("valid.zip");
        write_zip(&path, &[("dump.sql", b"select 1;"), ("meta.json", b"{}")]);
        assert_eq!(inspect_archive(&path).unwrap(), 2);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn inspect_rejects_non_zip_payload() {
        let path = temp_path("garbage.zip");
        fs::write(&path, b"definitely not a zip").unwrap();
        let err = inspect_archive(&path).unwrap_err();
        assert!(err.to_string().contains("zip"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn inspect_rejects_empty_archive() {
        let path = temp_path("empty.zip");
        write_zip(&path, &[]);
        let err = inspect_archive(&path).unwrap_err();
        assert!(err.to_string().contains("空"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn write_download_creates_parent_dirs() {
        let dir = temp_path("nested");
        let _ = fs::remove_dir_all(&dir);
        let target = dir.join("backups").join("dump.zip");
        write_download(&target, b"bytes").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"bytes");
        let _ = fs::remove_dir_all(&dir);
    }
}
