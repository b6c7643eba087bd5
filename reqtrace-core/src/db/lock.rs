//! Single-instance guard for a database file

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

/// Exclusive advisory lock on `<db>.lock`, held for as long as the store is open
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    lock_file_path: PathBuf,
}

impl InstanceLock {
    /// Acquire the lock for `db_path`, failing immediately if another process holds it
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let lock_file_path = lock_path_for(db_path);

        if let Some(parent) = lock_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_file_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                log::debug!("Acquired instance lock {:?}", lock_file_path);
                Ok(Self {
                    file,
                    lock_file_path,
                })
            }
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(StoreError::Locked(db_path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("Failed to release lock {:?}: {}", self.lock_file_path, e);
        }
    }
}

fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut name: OsString = db_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
