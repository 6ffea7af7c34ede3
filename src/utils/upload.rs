use crate::utils::error::AppError;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory product images are written to; served statically under
/// `/uploads`.
pub const UPLOAD_DIR: &str = "uploads/product-images";

/// Per-file cap, matches the 5 MB multipart limit of the upload form.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

pub fn ensure_upload_dir() -> std::io::Result<()> {
    fs::create_dir_all(UPLOAD_DIR)
}

/// Builds a destination path `<millis>-<original>` inside `dir`. The
/// original name is reduced to its file-name component, so client-supplied
/// path separators cannot escape the upload directory. Two uploads landing
/// in the same millisecond with the same name get a numeric infix; the
/// returned path is unique at call time.
pub fn unique_path(dir: &Path, original: &str) -> PathBuf {
    let file_name = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let base = format!("{}-{}", Utc::now().timestamp_millis(), file_name);
    let mut candidate = dir.join(&base);
    let mut attempt = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{}-{}", attempt, base));
        attempt += 1;
    }
    candidate
}

/// Persists one uploaded file and returns its stored relative path.
pub fn save_file(original: &str, bytes: &[u8]) -> Result<String, AppError> {
    if bytes.len() > MAX_FILE_BYTES {
        return Err(AppError::Validation(format!(
            "File '{}' exceeds the 5 MB upload limit",
            original
        )));
    }

    let path = unique_path(Path::new(UPLOAD_DIR), original);
    fs::write(&path, bytes)?;

    log::info!("📸 Stored upload: {}", path.display());
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_path_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = unique_path(dir.path(), "photo.jpg");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-photo.jpg"));
        let millis: i64 = name.trim_end_matches("-photo.jpg").parse().unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn test_unique_path_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_path(dir.path(), "photo.jpg");
        fs::write(&first, b"x").unwrap();

        // Same millisecond, same name: must still come back distinct.
        let second = unique_path(dir.path(), "photo.jpg");
        assert_ne!(second, first);
        assert!(!second.exists());
    }

    #[test]
    fn test_path_traversal_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = unique_path(dir.path(), "../../etc/passwd");
        assert_eq!(path.parent().unwrap(), dir.path());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-passwd"));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let bytes = vec![0u8; MAX_FILE_BYTES + 1];
        let result = save_file("big.jpg", &bytes);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
