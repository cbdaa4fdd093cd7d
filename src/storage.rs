//! File helpers shared by the JSON stores.

use std::io::Write;
use std::path::{Path, PathBuf};
use crate::error::LeetspaceError;

/// Map an owner id onto a file name. Safe characters pass through and every
/// other byte becomes `~xx`, so distinct owners never share a file.
pub fn owner_file_stem(owner: &str) -> Result<String, LeetspaceError> {
    if owner.is_empty() {
        return Err(LeetspaceError::validation("owner id must not be empty"));
    }
    let mut stem = String::with_capacity(owner.len());
    for byte in owner.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("~{:02x}", byte));
        }
    }
    Ok(stem)
}

/// Replace `path` with `bytes` in one rename. The temp file is unique per
/// call and lives next to the target, so concurrent writers (in this process
/// or another) never clobber each other's half-written data.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>, stage: &'static str) -> Result<(), LeetspaceError> {
    let target: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&target, &bytes, stage))
        .await
        .map_err(|e| LeetspaceError::new(format!("Write task failed: {}", e), stage))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8], stage: &'static str) -> Result<(), LeetspaceError> {
    let dir = path
        .parent()
        .ok_or_else(|| LeetspaceError::new("Target path has no parent directory", stage)
            .with_context(format!("path: {:?}", path)))?;
    std::fs::create_dir_all(dir)
        .map_err(|e| LeetspaceError::new(format!("Failed to create directory: {}", e), stage)
            .with_context(format!("path: {:?}", dir)))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| LeetspaceError::new(format!("Failed to create temp file: {}", e), stage)
            .with_context(format!("dir: {:?}", dir)))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LeetspaceError::new(format!("Failed to write temp file: {}", e), stage)
            .with_context(format!("path: {:?}", tmp.path())))?;
    tmp.persist(path)
        .map_err(|e| LeetspaceError::new(format!("Failed to replace file: {}", e.error), stage)
            .with_context(format!("path: {:?}", path)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_file_stem_is_injective() {
        assert_eq!(owner_file_stem("alice-01_x").unwrap(), "alice-01_x");
        assert_eq!(owner_file_stem("a/b c").unwrap(), "a~2fb~20c");
        assert_ne!(owner_file_stem("a/b").unwrap(), owner_file_stem("a_b").unwrap());
        assert_ne!(owner_file_stem("a~2f").unwrap(), owner_file_stem("a/").unwrap());
        assert!(owner_file_stem("").is_err());
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        write_atomic(&path, b"first".to_vec(), "io").await.unwrap();
        write_atomic(&path, b"second".to_vec(), "io").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
