use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing mutations of the profile library.
///
/// Every write is a read-modify-write of one JSON file, so concurrent
/// `dk` invocations must take turns. Uses platform-native flock on Unix.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not lock {path}: another dk process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Acquire the lock for the library directory, waiting up to
    /// `timeout` for another process to release it.
    pub fn acquire(library_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = library_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateError {
                path: path.clone(),
                source: e,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
        Ok(FileLock { _file: file, path })
    }

    /// Acquire with the default timeout.
    pub fn acquire_default(library_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(library_dir, DEFAULT_TIMEOUT)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // flock releases with the descriptor; the file itself is litter
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    // Advisory only; non-Unix platforms proceed unlocked
    Ok(())
}
