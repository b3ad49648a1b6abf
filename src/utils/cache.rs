use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::AsyncWriteExt;

use crate::error::PharmaGuardError;

pub const CACHE_DIR_ENV: &str = "PHARMAGUARD_CACHE_DIR";

pub fn pharmaguard_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    match dirs::cache_dir() {
        Some(dir) => dir.join("pharmaguard"),
        None => std::env::temp_dir().join("pharmaguard"),
    }
}

/// Writes `content` to `path` through a uniquely named sibling temp file and a
/// rename, so readers never observe a partial file.
pub async fn save_atomic(path: &Path, content: &str) -> Result<(), PharmaGuardError> {
    let Some(dir) = path.parent() else {
        return Err(PharmaGuardError::InvalidArgument(
            "Invalid store path (no parent directory)".into(),
        ));
    };
    let Some(stem) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(PharmaGuardError::InvalidArgument(
            "Invalid store path (no file name)".into(),
        ));
    };
    tokio::fs::create_dir_all(dir).await?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut opened = None;
    for attempt in 0..32_u32 {
        let candidate = dir.join(format!(
            ".{stem}.{}.{}.tmp",
            std::process::id(),
            seed.saturating_add(attempt as u128)
        ));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => {
                opened = Some((candidate, file));
                break;
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    let Some((tmp_path, mut file)) = opened else {
        return Err(PharmaGuardError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "Unable to allocate temporary store file",
        )));
    };

    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    drop(file);

    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "pharmaguard-test-{label}-{}-{nanos}",
        std::process::id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_atomic_creates_parent_and_replaces_content() {
        let dir = scratch_dir("atomic");
        let path = dir.join("nested").join("report.json");

        save_atomic(&path, "{\"a\":1}").await.expect("first write");
        save_atomic(&path, "{\"a\":2}").await.expect("second write");

        let body = tokio::fs::read_to_string(&path).await.expect("read back");
        assert_eq!(body, "{\"a\":2}");

        let mut entries = tokio::fs::read_dir(path.parent().expect("parent"))
            .await
            .expect("read dir");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.expect("entry") {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["report.json".to_string()]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
