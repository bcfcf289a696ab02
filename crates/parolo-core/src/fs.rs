//! Durable writes.
//!
//! Text is written to a fresh temporary file in the target's parent directory
//! (same filesystem), flushed to disk, then renamed over the target. Readers
//! see either the previous content or the complete new content. A failed
//! write leaves no artifact under the target name; the temporary file is
//! removed when it is dropped.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::trace;

use crate::errors::{ParoloError, Result};

/// Atomically replace `path` with `text`, creating parent directories.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let tmp = stage(path, text)?;
    commit(tmp, path)
}

/// Step used to re-stamp a file whose filesystem dropped the sub-second part
/// of the first stamp. Covers 1 s and 2 s mtime resolutions.
const COARSE_MTIME_STEP: Duration = Duration::from_secs(2);

/// Atomically replace `path` with `text` and stamp it with a modification
/// time greater than the one it replaces.
///
/// The stamp is `max(now, previous + 1ns)`. When the filesystem records
/// mtimes at whole-second (or two-second) resolution the first stamp
/// truncates back to the previous value; the file is then re-stamped at
/// `previous + 2s`. A burst of writes on such a filesystem therefore runs
/// the mtime ahead of the wall clock.
///
/// Known limitation: on a filesystem that ignores explicit mtimes, or whose
/// resolution is coarser than two seconds, the returned time can equal the
/// previous one. Returns the modification time as recorded by the
/// filesystem.
pub fn write_atomic_stamped(path: &Path, text: &str) -> Result<SystemTime> {
    let previous = modified_time(path)?;
    let stamp = next_stamp(previous, SystemTime::now());

    let tmp = stage(path, text)?;
    tmp.as_file()
        .set_modified(stamp)
        .map_err(|e| ParoloError::io(tmp.path(), e))?;
    commit(tmp, path)?;

    let recorded = modified_time(path)?.unwrap_or(stamp);
    match previous {
        Some(prev) if recorded <= prev => restamp(path, prev + COARSE_MTIME_STEP),
        _ => Ok(recorded),
    }
}

fn next_stamp(previous: Option<SystemTime>, now: SystemTime) -> SystemTime {
    match previous.map(|prev| prev + Duration::from_nanos(1)) {
        Some(floor) if floor > now => floor,
        _ => now,
    }
}

fn restamp(path: &Path, stamp: SystemTime) -> Result<SystemTime> {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .map_err(|e| ParoloError::io(path, e))?;
    file.set_modified(stamp)
        .map_err(|e| ParoloError::io(path, e))?;
    drop(file);
    trace!(path = %path.display(), "mtime re-stamped at coarse resolution");
    Ok(modified_time(path)?.unwrap_or(stamp))
}

/// Modification time of `path`, or `None` if it does not exist.
pub fn modified_time(path: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| ParoloError::io(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ParoloError::io(path, e)),
    }
}

/// Read a UTF-8 file, mapping a missing file to `Ok(None)`.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ParoloError::io(path, e)),
    }
}

fn stage(path: &Path, text: &str) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| ParoloError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| ParoloError::io(parent, e))?;
    tmp.write_all(text.as_bytes())
        .map_err(|e| ParoloError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ParoloError::io(tmp.path(), e))?;
    Ok(tmp)
}

fn commit(tmp: NamedTempFile, path: &Path) -> Result<()> {
    let _ = tmp
        .persist(path)
        .map_err(|e| ParoloError::io(path, e.error))?;
    sync_parent(path);
    trace!(path = %path.display(), "atomic write committed");
    Ok(())
}

/// Flush the directory entry of a freshly renamed file. Best effort: not every
/// platform allows opening a directory for syncing.
fn sync_parent(path: &Path) {
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("latest.txt");
        write_atomic(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn replaces_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latest.txt");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latest.txt");
        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["latest.txt".to_string()]);
    }

    #[test]
    fn writes_bytes_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v0001.txt");
        let text = "line one\r\n  line two\n\nünïcødé\n";
        write_atomic(&path, text).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn stamped_writes_strictly_increase() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latest.txt");
        let mut last = write_atomic_stamped(&path, "0").unwrap();
        for i in 1..20 {
            let next = write_atomic_stamped(&path, &i.to_string()).unwrap();
            assert!(next > last, "write {i} did not advance the mtime");
            assert_eq!(modified_time(&path).unwrap(), Some(next));
            last = next;
        }
    }

    #[test]
    fn stamp_stays_ahead_of_a_future_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latest.txt");
        write_atomic(&path, "old").unwrap();
        let ahead = SystemTime::now() + Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(ahead)
            .unwrap();

        let stamped = write_atomic_stamped(&path, "new").unwrap();
        assert!(stamped > ahead);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn next_stamp_uses_later_of_clock_and_floor() {
        let now = SystemTime::now();
        assert_eq!(next_stamp(None, now), now);

        let past = now - Duration::from_secs(5);
        assert_eq!(next_stamp(Some(past), now), now);

        let future = now + Duration::from_secs(5);
        assert_eq!(next_stamp(Some(future), now), future + Duration::from_nanos(1));
    }

    #[test]
    fn restamp_moves_mtime_forward() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("latest.txt");
        write_atomic(&path, "x").unwrap();
        let prev = modified_time(&path).unwrap().unwrap();

        let recorded = restamp(&path, prev + COARSE_MTIME_STEP).unwrap();
        assert!(recorded > prev);
        assert_eq!(modified_time(&path).unwrap(), Some(recorded));
    }

    #[test]
    fn modified_time_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(modified_time(&tmp.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn read_optional_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_optional(&tmp.path().join("nope")).unwrap(), None);
        let path = tmp.path().join("here.txt");
        std::fs::write(&path, "x").unwrap();
        assert_eq!(read_optional(&path).unwrap().as_deref(), Some("x"));
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_parent_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "file, not dir").unwrap();
        let err = write_atomic(&blocker.join("latest.txt"), "x").unwrap_err();
        assert_matches!(err, ParoloError::Io { .. });
    }
}
