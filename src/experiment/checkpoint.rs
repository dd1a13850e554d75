//! Locating the checkpoint a training run produced

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{Error, Result};

/// Newest checkpoint file in `dir`.
///
/// Files are ranked by modification time; equal times fall back to the
/// greater file name, so timestamped names still sort correctly on
/// filesystems with coarse mtimes. Subdirectories are ignored.
///
/// # Errors
///
/// Returns [`Error::MissingCheckpoint`] if `dir` holds no files, or an IO
/// error if it cannot be listed.
pub fn latest_checkpoint(dir: &Path) -> Result<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let path = entry.path();

        let is_newer = newest.as_ref().map_or(true, |(time, best)| {
            (modified, path.file_name()) > (*time, best.file_name())
        });
        if is_newer {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| Error::MissingCheckpoint(dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, modified: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_picks_most_recent_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&dir.path().join("BPR-Mar-09-2024.pth"), base + Duration::from_secs(60));
        touch(&dir.path().join("BPR-Oct-01-2023.pth"), base);

        let latest = latest_checkpoint(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "BPR-Mar-09-2024.pth");
    }

    #[test]
    fn test_equal_mtime_uses_name() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        touch(&dir.path().join("a.pth"), base);
        touch(&dir.path().join("b.pth"), base);

        let latest = latest_checkpoint(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "b.pth");
    }

    #[test]
    fn test_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("zzz")).unwrap();
        touch(&dir.path().join("model.pth"), SystemTime::now());

        let latest = latest_checkpoint(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "model.pth");
    }

    #[test]
    fn test_empty_dir_is_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            latest_checkpoint(dir.path()),
            Err(Error::MissingCheckpoint(_))
        ));
    }
}
