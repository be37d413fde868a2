//! Cross-process writer lock.
//!
//! `serve`, `apply`, `add` and `publish` can run as separate processes against
//! the same app group. Each one holds this lock from the moment it re-reads the
//! canonical list until the snapshot is published, so two writers never work
//! from the same stale copy.
//!
//! The lock is an advisory `flock` on `relay/writer.lock`. The kernel drops it
//! when the holder exits, so a crashed relay never leaves a stale lock behind.

use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::error::{RelayError, Result};

pub struct WriterLock {
    file: fs_err::File,
    path: PathBuf,
}

impl WriterLock {
    /// Blocks until this process holds the lock at `path`.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent).map_err(|e| RelayError::Io {
                context: format!("creating lock directory {}", parent.display()),
                source: e,
            })?;
        }

        let file = fs_err::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| RelayError::Io {
                context: "opening writer lock".to_string(),
                source: e,
            })?;

        loop {
            if unsafe { libc::flock(file.file().as_raw_fd(), libc::LOCK_EX) } == 0 {
                break;
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(RelayError::Io {
                    context: format!("locking {}", path.display()),
                    source: err,
                });
            }
        }

        tracing::trace!(path = %path.display(), "Writer lock acquired");
        Ok(WriterLock {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        unsafe {
            libc::flock(self.file.file().as_raw_fd(), libc::LOCK_UN);
        }
        tracing::trace!(path = %self.path.display(), "Writer lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("relay").join("writer.lock");

        let _lock = WriterLock::acquire(&path).unwrap();

        assert!(path.is_file());
    }

    #[test]
    fn test_second_writer_waits_for_release() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("writer.lock");
        let first = WriterLock::acquire(&path).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            let _second = WriterLock::acquire(&waiter_path).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(first);
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        waiter.join().unwrap();
    }

    #[test]
    fn test_lock_can_be_reacquired_after_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("writer.lock");

        drop(WriterLock::acquire(&path).unwrap());

        assert!(WriterLock::acquire(&path).is_ok());
    }
}
