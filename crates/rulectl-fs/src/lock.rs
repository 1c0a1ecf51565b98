//! Advisory file locks
//!
//! Locks are `fs2` advisory locks on a dedicated lock file. They are held
//! for as long as the returned [`FileLock`] lives and released on drop, so
//! a crashed process never leaves a stale lock behind.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// How a lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers at once.
    Shared,
    /// One holder, no readers.
    Exclusive,
}

/// A held advisory lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl FileLock {
    /// Acquire a lock, blocking until it is available.
    ///
    /// Meant for short critical sections such as a batch of record writes.
    pub fn acquire(path: &NormalizedPath, mode: LockMode) -> Result<Self> {
        let (file, native) = open_lock_file(path)?;
        let locked = match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|_| Error::LockFailed {
            path: native.clone(),
        })?;

        tracing::trace!(path = %native.display(), ?mode, "Lock acquired");
        Ok(Self {
            file,
            path: native,
            mode,
        })
    }

    /// Acquire an exclusive lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockHeld`] if another holder already has the lock.
    pub fn try_exclusive(path: &NormalizedPath) -> Result<Self> {
        let (file, native) = open_lock_file(path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                tracing::debug!(path = %native.display(), "Exclusive lock acquired");
                Ok(Self {
                    file,
                    path: native,
                    mode: LockMode::Exclusive,
                })
            }
            Err(e) if is_contended(&e) => Err(Error::LockHeld { path: native }),
            Err(_) => Err(Error::LockFailed { path: native }),
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if FileExt::unlock(&self.file).is_err() {
            tracing::warn!(path = %self.path.display(), "Failed to release lock");
        }
    }
}

fn open_lock_file(path: &NormalizedPath) -> Result<(File, PathBuf)> {
    let native = path.to_native();
    if let Some(parent) = native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&native)
        .map_err(|e| Error::io(&native, e))?;
    Ok((file, native))
}

fn is_contended(error: &std::io::Error) -> bool {
    error.kind() == std::io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
