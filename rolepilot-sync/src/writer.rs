//! Hash-gated atomic writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. Serialize the document (already done by caller).
//! 2. SHA-256 hash the new content.
//! 3. Hash the current on-disk content, if any.
//! 4. Skip the write if the digests match.
//! 5. Resolve symlinks so the real file is replaced, not the link.
//! 6. Write to `<target>.rolepilot.tmp` carrying the target's permissions.
//! 7. Rename to the target (atomic on POSIX).
//! 8. If the target is a mount point (`EBUSY`) or the rename crosses
//!    filesystems (`EXDEV`), write the target in place instead.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf, digest: String },
    /// File was skipped because the on-disk content already matches.
    Unchanged { path: PathBuf, digest: String },
    /// Dry-run: the file *would* have been written.
    WouldWrite { path: PathBuf, digest: String },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::Unchanged { path, .. }
            | WriteResult::WouldWrite { path, .. } => path,
        }
    }

    pub fn digest(&self) -> &str {
        match self {
            WriteResult::Written { digest, .. }
            | WriteResult::Unchanged { digest, .. }
            | WriteResult::WouldWrite { digest, .. } => digest,
        }
    }
}

/// Hex SHA-256 of `content`.
pub fn digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

/// Atomically replace `path` with `content` unless it already holds it.
///
/// A symlinked `path` stays a symlink; the file it points at is replaced.
pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let target = resolve_target(path)?;
    let tmp = PathBuf::from(format!("{}.rolepilot.tmp", target.display()));
    atomic_write_with_tmp(path, &target, content, dry_run, &tmp)
}

/// Final file behind `path`; `path` itself when it does not exist yet.
fn resolve_target(path: &Path) -> Result<PathBuf, SyncError> {
    match std::fs::canonicalize(path) {
        Ok(target) => Ok(target),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn atomic_write_with_tmp(
    path: &Path,
    target: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    let new_digest = digest(content);

    if let Some(current) = read_existing(target)? {
        if digest(&current) == new_digest {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
                digest: new_digest,
            });
        }
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
            digest: new_digest,
        });
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = copy_permissions(target, tmp) {
        let _ = std::fs::remove_file(tmp);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(tmp, target) {
        let _ = std::fs::remove_file(tmp);
        if !is_cross_mount(&e) {
            return Err(io_err(target, e));
        }
        tracing::warn!(
            "rename onto {} failed ({e}); writing in place",
            target.display()
        );
        std::fs::write(target, content).map_err(|e| io_err(target, e))?;
    }

    tracing::info!("wrote: {} ({})", path.display(), &new_digest[..12]);
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        digest: new_digest,
    })
}

/// Give `tmp` the mode of an existing `target`.
fn copy_permissions(target: &Path, tmp: &Path) -> Result<(), SyncError> {
    let perms = match std::fs::metadata(target) {
        Ok(meta) => meta.permissions(),
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(io_err(target, err)),
    };
    std::fs::set_permissions(tmp, perms).map_err(|e| io_err(tmp, e))
}

/// Rename failures that a plain in-place write can still satisfy.
#[cfg(unix)]
fn is_cross_mount(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EBUSY | libc::EXDEV))
}

#[cfg(not(unix))]
fn is_cross_mount(_err: &io::Error) -> bool {
    false
}

/// Current content of `path`, or `None` if it does not exist.
pub(crate) fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        let result = atomic_write(&path, "{}", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        atomic_write(&path, "same", false).unwrap();
        let result = atomic_write(&path, "same", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        atomic_write(&path, "v1", false).unwrap();
        let result = atomic_write(&path, "v2", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(result.digest(), digest("v2"));
    }

    #[test]
    fn dry_run_does_not_touch_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        fs::write(&path, "old").unwrap();
        let result = atomic_write(&path, "new", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        atomic_write(&path, "data", false).unwrap();
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["containerpilot.json"], ".rolepilot.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_config_stays_a_symlink() {
        let tmp = TempDir::new().unwrap();
        let real_dir = tmp.path().join("real");
        fs::create_dir_all(&real_dir).unwrap();
        let real = real_dir.join("containerpilot.json");
        fs::write(&real, "old").unwrap();
        let link = tmp.path().join("containerpilot.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let result = atomic_write(&link, "new", false).unwrap();

        assert_eq!(result.path(), link.as_path());
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
        assert_eq!(fs::read_dir(&real_dir).unwrap().count(), 1);
    }

    #[test]
    #[cfg(unix)]
    fn existing_mode_is_kept() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("containerpilot.json");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        atomic_write(&path, "new", false).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    #[cfg(unix)]
    fn busy_and_cross_device_renames_fall_back() {
        assert!(is_cross_mount(&io::Error::from_raw_os_error(libc::EBUSY)));
        assert!(is_cross_mount(&io::Error::from_raw_os_error(libc::EXDEV)));
        assert!(!is_cross_mount(&io::Error::from_raw_os_error(libc::EACCES)));
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("containerpilot.json");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("containerpilot.json.rolepilot.tmp");

        let result = atomic_write_with_tmp(&path, &path, "new content", false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when rename failed.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".rolepilot.tmp should be cleaned up");
        }
    }
}
