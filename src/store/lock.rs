//! Advisory lock on `<data file>.lock`.
//!
//! The lock is an `flock` on a side file, never on the data file itself, so
//! atomic renames of the data file do not disturb it. A held [`FileLock`]
//! is released when it is dropped or passed to [`FileLock::release`].

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;

use crate::error::{Result, TrackerError};

/// First sleep after a busy attempt; doubles up to [`MAX_BACKOFF`].
const FIRST_BACKOFF: Duration = Duration::from_millis(1);
/// Last sleep before giving up, roughly one second of waiting in total.
const MAX_BACKOFF: Duration = Duration::from_millis(512);

#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Take the exclusive lock, creating the lock file if needed.
    ///
    /// A busy lock is retried with doubling sleeps; once the backoff passes
    /// [`MAX_BACKOFF`] the call fails with [`TrackerError::Locked`].
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| TrackerError::io(path, e))?;

        let mut backoff = FIRST_BACKOFF;
        while let Err(e) = file.try_lock_exclusive() {
            if backoff > MAX_BACKOFF {
                tracing::debug!(path = %path.display(), error = %e, "giving up on lock");
                return Err(TrackerError::Locked(path.display().to_string()));
            }
            tracing::trace!(path = %path.display(), ?backoff, "lock busy");
            std::thread::sleep(backoff);
            backoff *= 2;
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock now and report failures, instead of relying on drop.
    pub fn release(self) -> Result<()> {
        FileExt::unlock(&self.file).map_err(|e| TrackerError::io(&self.path, e))
    }
}
