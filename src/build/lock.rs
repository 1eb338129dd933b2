//! Inter-process lock around the CMake configure step
//!
//! pre-commit runs hooks in parallel, and several of them may want to
//! configure the same build directory at once. Two lock files inside the
//! build directory make sure only one process runs CMake:
//!
//! - `_cmake_configure_try_lock`: whoever grabs it without waiting becomes
//!   the leader and runs CMake;
//! - `_cmake_configure_lock`: held exclusively by the leader while CMake
//!   runs.
//!
//! Every other process first waits for a shared lock on the try-lock and only
//! then takes a shared lock on the main lock. A follower therefore never holds
//! the main lock while a leader is still about to take it.

use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the lock held while CMake configure runs
pub const CONFIGURE_LOCK: &str = "_cmake_configure_lock";

/// Name of the lock deciding which process runs CMake configure
pub const CONFIGURE_TRY_LOCK: &str = "_cmake_configure_try_lock";

/// Outcome of [`ConfigureLock::acquire`]
#[derive(Debug)]
pub enum ConfigureRole {
    /// This process must run CMake; the locks are released on drop
    Leader(ConfigureGuard),
    /// Another process ran CMake and has finished
    Follower,
}

/// Locks held by the leader
#[derive(Debug)]
pub struct ConfigureGuard {
    // Fields drop in order: the main lock goes first.
    _lock: File,
    _try_lock: File,
}

/// The pair of lock files of a build directory
#[derive(Debug, Clone)]
pub struct ConfigureLock {
    lock_path: PathBuf,
    try_lock_path: PathBuf,
}

impl ConfigureLock {
    /// Create the lock for `build_dir` (the directory must exist)
    pub fn new(build_dir: &Path) -> Self {
        Self {
            lock_path: build_dir.join(CONFIGURE_LOCK),
            try_lock_path: build_dir.join(CONFIGURE_TRY_LOCK),
        }
    }

    /// Paths of both lock files
    pub fn paths(&self) -> [&Path; 2] {
        [&self.lock_path, &self.try_lock_path]
    }

    /// Whether `path` is one of the lock files
    pub fn is_lock_file(&self, path: &Path) -> bool {
        self.paths().contains(&path)
    }

    /// Either become the leader or wait for the current leader to finish
    pub fn acquire(&self) -> Result<ConfigureRole> {
        let try_lock = open_lock_file(&self.try_lock_path)?;

        match try_lock.try_lock() {
            Ok(()) => {
                let lock = open_lock_file(&self.lock_path)?;
                lock.lock().with_context(|| {
                    format!("Failed to lock {}", self.lock_path.display())
                })?;
                Ok(ConfigureRole::Leader(ConfigureGuard {
                    _lock: lock,
                    _try_lock: try_lock,
                }))
            }
            Err(TryLockError::WouldBlock) => {
                // The leader may not hold the main lock yet; its try-lock is
                // only released once CMake is done.
                try_lock.lock_shared().with_context(|| {
                    format!("Failed to wait on {}", self.try_lock_path.display())
                })?;
                let lock = open_lock_file(&self.lock_path)?;
                lock.lock_shared().with_context(|| {
                    format!("Failed to wait on {}", self.lock_path.display())
                })?;
                Ok(ConfigureRole::Follower)
            }
            Err(TryLockError::Error(e)) => Err(e).with_context(|| {
                format!("Failed to lock {}", self.try_lock_path.display())
            }),
        }
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_single_process_is_leader() {
        let temp_dir = TempDir::new().unwrap();
        let lock = ConfigureLock::new(temp_dir.path());

        let role = lock.acquire().unwrap();
        assert!(matches!(role, ConfigureRole::Leader(_)));
        assert!(temp_dir.path().join(CONFIGURE_LOCK).exists());
        assert!(temp_dir.path().join(CONFIGURE_TRY_LOCK).exists());
        drop(role);

        // Locks are released once the guard is dropped
        assert!(matches!(lock.acquire().unwrap(), ConfigureRole::Leader(_)));
    }

    #[test]
    fn test_follower_waits_for_leader() {
        let temp_dir = TempDir::new().unwrap();
        let lock = ConfigureLock::new(temp_dir.path());

        let leader = lock.acquire().unwrap();
        assert!(matches!(leader, ConfigureRole::Leader(_)));

        let other = lock.clone();
        let handle = thread::spawn(move || other.acquire().unwrap());

        thread::sleep(Duration::from_millis(200));
        assert!(!handle.is_finished());

        drop(leader);
        let role = handle.join().unwrap();
        assert!(matches!(role, ConfigureRole::Follower));
    }

    #[test]
    fn test_follower_leaves_main_lock_to_leader() {
        let temp_dir = TempDir::new().unwrap();
        let lock = ConfigureLock::new(temp_dir.path());

        // A leader that won the try-lock but has not locked the main file yet
        let leader_try = open_lock_file(&temp_dir.path().join(CONFIGURE_TRY_LOCK)).unwrap();
        leader_try.try_lock().unwrap();

        let other = lock.clone();
        let handle = thread::spawn(move || other.acquire().unwrap());
        thread::sleep(Duration::from_millis(300));

        let leader_main = open_lock_file(&temp_dir.path().join(CONFIGURE_LOCK)).unwrap();
        assert!(leader_main.try_lock().is_ok());
        assert!(!handle.is_finished());

        drop(leader_main);
        drop(leader_try);
        let role = handle.join().unwrap();
        assert!(matches!(role, ConfigureRole::Follower));
    }

    #[test]
    fn test_is_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let lock = ConfigureLock::new(temp_dir.path());
        assert!(lock.is_lock_file(&temp_dir.path().join(CONFIGURE_LOCK)));
        assert!(lock.is_lock_file(&temp_dir.path().join(CONFIGURE_TRY_LOCK)));
        assert!(!lock.is_lock_file(&temp_dir.path().join("CMakeCache.txt")));
    }
}
