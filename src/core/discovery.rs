use crate::utils::error::{MediaError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 遞迴搜尋 `root` 底下副檔名符合 `extension`（不分大小寫）的檔案
///
/// 無法讀取的目錄（包含根目錄本身，例如 FIFO 或權限不足）會記錄警告後略過，
/// 視同空目錄；符號連結的目錄不會被追蹤。回傳結果已排序。
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(MediaError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let mut out = Vec::new();

    if root.is_file() {
        if matches_suffix(root, &suffix) {
            out.push(root.to_path_buf());
        }
        return Ok(out);
    }

    if let Err(e) = collect_matching(root, &suffix, &mut out) {
        tracing::warn!("⚠️ Cannot walk {}: {}", root.display(), e);
        return Ok(Vec::new());
    }
    out.sort();
    Ok(out)
}

fn matches_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(suffix))
}

fn collect_matching(dir: &Path, suffix: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if ft.is_dir() {
            if let Err(e) = collect_matching(&path, suffix, out) {
                tracing::warn!("⚠️ Skipping directory {}: {}", path.display(), e);
            }
        } else if (ft.is_file() || (ft.is_symlink() && path.is_file()))
            && matches_suffix(&path, suffix)
        {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discovers_nested_files_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.mp4"));
        touch(&root.join("season1/B.MP4"));
        touch(&root.join("season1/deep/c.Mp4"));
        touch(&root.join("season1/notes.txt"));
        touch(&root.join("clip.mp4.part"));

        let found = discover_files(root, "mp4").unwrap();

        assert_eq!(found.len(), 3);
        assert!(found.contains(&root.join("a.mp4")));
        assert!(found.contains(&root.join("season1/B.MP4")));
        assert!(found.contains(&root.join("season1/deep/c.Mp4")));
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }

    #[test]
    fn test_directory_named_like_extension_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("raw.mp4")).unwrap();

        let found = discover_files(temp_dir.path(), "mp4").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_directory_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_files(temp_dir.path(), "mp4").unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover_files(&temp_dir.path().join("nope"), "mp4").unwrap_err();
        assert!(matches!(err, MediaError::InputNotFound { .. }));
    }

    #[test]
    fn test_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("talk.MP4");
        touch(&file);

        assert_eq!(discover_files(&file, "mp4").unwrap(), vec![file.clone()]);
        assert!(discover_files(&file, "mkv").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unwalkable_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let fifo = temp_dir.path().join("pipe");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        assert!(discover_files(&fifo, "mp4").unwrap().is_empty());
    }
}
