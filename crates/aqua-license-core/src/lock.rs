//! Exclusive lock around profile store mutations.

use crate::error::{AquaError, Result};
use fslock::LockFile;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Held for the whole read-modify-write-rename cycle; released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: LockFile,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock, polling until `timeout` elapses.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let mut file = LockFile::open(path).map_err(|e| {
            AquaError::store_io(path, std::io::Error::other(e.to_string()))
        })?;

        let started = Instant::now();
        loop {
            let acquired = file.try_lock().map_err(|e| {
                AquaError::store_io(path, std::io::Error::other(e.to_string()))
            })?;
            if acquired {
                tracing::trace!("Acquired store lock {}", path.display());
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }

            let waited = started.elapsed();
            if waited >= timeout {
                tracing::debug!(
                    "Timed out after {:?} waiting for store lock {}",
                    waited,
                    path.display()
                );
                return Err(AquaError::StoreLocked {
                    path: path.to_path_buf(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            thread::sleep(POLL_INTERVAL.min(timeout - waited));
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release store lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_holder_times_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.toml.lock");

        let held = StoreLock::acquire(&path, Duration::from_secs(1)).unwrap();
        let err = StoreLock::acquire(&path, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, AquaError::StoreLocked { .. }), "{err:?}");

        drop(held);
        StoreLock::acquire(&path, Duration::from_millis(100)).unwrap();
    }
}
