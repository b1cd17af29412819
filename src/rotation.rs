//! Size-based log rotation: an oversized file is renamed aside with a
//! timestamp suffix so writes continue against a fresh file at the original
//! path. No cross-process locking; two processes rotating the same path
//! concurrently may race (known limitation).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::LogError;

/// What `maybe_rotate` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The file is absent or within the threshold.
    NotNeeded,
    /// The file was renamed to the contained path.
    Rotated(PathBuf),
}

/// Rotates `path` aside if its size exceeds `threshold_bytes`.
///
/// A file exactly at the threshold is left alone. The rotated name is
/// `<path>.<yyyyMMddHHmmss>`. A rename failure is returned so the caller can
/// report it; the caller's write then proceeds against the file still at
/// `path`.
pub fn maybe_rotate(path: &Path, threshold_bytes: u64) -> Result<RotationOutcome, LogError> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(_) => return Ok(RotationOutcome::NotNeeded),
    };
    if size <= threshold_bytes {
        return Ok(RotationOutcome::NotNeeded);
    }

    let suffix = Local::now().format("%Y%m%d%H%M%S");
    let mut rotated = path.as_os_str().to_owned();
    rotated.push(format!(".{}", suffix));
    let rotated = PathBuf::from(rotated);

    fs::rename(path, &rotated).map_err(|source| LogError::Rotation {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RotationOutcome::Rotated(rotated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.log");
        assert_eq!(maybe_rotate(&path, 10).unwrap(), RotationOutcome::NotNeeded);
    }

    #[test]
    fn file_at_threshold_is_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[b'x'; 10])
            .unwrap();
        assert_eq!(maybe_rotate(&path, 10).unwrap(), RotationOutcome::NotNeeded);
        assert!(path.exists());
    }

    #[test]
    fn file_one_byte_over_is_rotated_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[b'x'; 11])
            .unwrap();

        let outcome = maybe_rotate(&path, 10).unwrap();
        let rotated = match outcome {
            RotationOutcome::Rotated(p) => p,
            other => panic!("expected rotation, got {:?}", other),
        };
        assert!(rotated.exists());
        assert_eq!(std::fs::metadata(&rotated).unwrap().len(), 11);
        // The original path is gone until the next append recreates it.
        assert!(!path.exists());

        // Suffix is ".<14 digit timestamp>" on the full original name.
        let name = rotated.file_name().unwrap().to_string_lossy().into_owned();
        let suffix = name.strip_prefix("app.log.").unwrap();
        assert_eq!(suffix.len(), 14);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));

        // A second check sees no file and does nothing.
        assert_eq!(maybe_rotate(&path, 10).unwrap(), RotationOutcome::NotNeeded);
    }
}
