//! # Filesystem Forks
//!
//! A fork backed by an advisory lock on `<dir>/fork-<index>.lock`. Holding the
//! fork means holding an exclusive `fs2` lock on that file. The lock file
//! itself is never deleted: it is just the thing being locked, so it may be
//! left over from an earlier run without meaning anything.
//!
//! The operating system drops the lock when the holder's file handle closes,
//! including when the holding process dies, so a crashed table never strands
//! a fork.
//!
//! Within one process, the two neighbours share a single [`FileFork`] and
//! therefore a single open file. OS locks are per open file, so an in-memory
//! flag arbitrates between tasks before the OS lock is requested.

use crate::framework::error::ForkError;
use crate::framework::fork::LockHandle;
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct FileFork {
    index: usize,
    path: PathBuf,
    file: Arc<File>,
    held: AtomicBool,
}

impl FileFork {
    /// Opens the lock file for fork `index` under `dir`, creating both if missing.
    ///
    /// Opening never takes or breaks a lock, so a fork held by another process
    /// stays held.
    pub fn open(dir: impl AsRef<Path>, index: usize) -> Result<Self, ForkError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ForkError::Io { index, source })?;

        let path = dir.join(format!("fork-{index}.lock"));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| ForkError::Io { index, source })?;

        Ok(Self {
            index,
            path,
            file: Arc::new(file),
            held: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_fault(&self, source: io::Error) -> ForkError {
        ForkError::Io {
            index: self.index,
            source,
        }
    }
}

/// Rolls back a claim that did not end with the OS lock held, including one
/// whose future was dropped mid-flight.
struct PendingClaim<'a> {
    fork: &'a FileFork,
}

impl Drop for PendingClaim<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&*self.fork.file);
        self.fork.held.store(false, Ordering::Release);
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == fs2::lock_contended_error().kind()
}

#[async_trait]
impl LockHandle for FileFork {
    fn index(&self) -> usize {
        self.index
    }

    async fn try_acquire(&self) -> Result<bool, ForkError> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        let pending = PendingClaim { fork: self };
        let file = Arc::clone(&self.file);
        let locked = tokio::task::spawn_blocking(move || FileExt::try_lock_exclusive(&*file)).await;

        match locked {
            Ok(Ok(())) => {
                std::mem::forget(pending);
                Ok(true)
            }
            Ok(Err(e)) if is_contended(&e) => Ok(false),
            Ok(Err(e)) => Err(self.io_fault(e)),
            Err(e) => Err(self.io_fault(io::Error::other(e))),
        }
    }

    /// Unlocking a held `flock` never waits, so this runs inline.
    fn release(&self) -> Result<(), ForkError> {
        if !self.held.load(Ordering::Acquire) {
            return Ok(());
        }
        let unlocked = FileExt::unlock(&*self.file).map_err(|e| self.io_fault(e));
        // Clear after unlocking, never before
        self.held.store(false, Ordering::Release);
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_fork_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let fork = FileFork::open(dir.path(), 4).unwrap();
        assert_eq!(fork.index(), 4);
        assert!(fork.path().ends_with("fork-4.lock"));
        assert!(fork.path().exists());

        assert!(fork.try_acquire().await.unwrap());
        assert!(!fork.try_acquire().await.unwrap());

        fork.release().unwrap();
        assert!(fork.try_acquire().await.unwrap());
    }

    #[tokio::test]
    async fn test_opening_does_not_steal_a_held_fork() {
        let dir = tempfile::tempdir().unwrap();
        let holder = FileFork::open(dir.path(), 0).unwrap();
        assert!(holder.try_acquire().await.unwrap());

        // A second table sharing the directory
        let rival = FileFork::open(dir.path(), 0).unwrap();
        assert!(!rival.try_acquire().await.unwrap(), "two holders of fork 0");

        // Releasing a fork it never got must not free the holder's lock
        rival.release().unwrap();
        assert!(!rival.try_acquire().await.unwrap());

        holder.release().unwrap();
        assert!(rival.try_acquire().await.unwrap());
        assert!(!holder.try_acquire().await.unwrap());
    }

    #[tokio::test]
    async fn test_closing_the_holder_frees_the_fork() {
        let dir = tempfile::tempdir().unwrap();
        let holder = FileFork::open(dir.path(), 2).unwrap();
        assert!(holder.try_acquire().await.unwrap());

        let rival = FileFork::open(dir.path(), 2).unwrap();
        assert!(!rival.try_acquire().await.unwrap());

        // No explicit release, as when the holding process dies
        drop(holder);
        assert!(rival.try_acquire().await.unwrap());
    }

    #[tokio::test]
    async fn test_leftover_lock_file_is_not_held() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fork-3.lock"), "left by an earlier run").unwrap();

        let fork = FileFork::open(dir.path(), 3).unwrap();
        assert!(fork.try_acquire().await.unwrap());
    }

    #[tokio::test]
    async fn test_release_when_free_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let fork = FileFork::open(dir.path(), 1).unwrap();
        fork.release().unwrap();
        fork.release().unwrap();
        assert!(fork.try_acquire().await.unwrap());
    }

    #[tokio::test]
    async fn test_unopenable_directory_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("table");
        fs::write(&blocker, "not a directory").unwrap();

        let err = FileFork::open(&blocker, 0).unwrap_err();
        assert!(matches!(err, ForkError::Io { index: 0, .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_on_shared_handle_have_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let fork = Arc::new(FileFork::open(dir.path(), 0).unwrap());

        let mut handles = vec![];
        for _ in 0..16 {
            let fork = fork.clone();
            handles.push(tokio::spawn(async move { fork.try_acquire().await.unwrap() }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
