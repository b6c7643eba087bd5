//! Database layer for the requirement store
//!
//! A single SQLite file holds the `requirements`, `traceability_matrix` and
//! `status_tracker` tables. Opening a store creates missing tables and takes
//! an exclusive instance lock on the file.

mod lock;
mod sqlite_backend;

pub use lock::InstanceLock;
pub use sqlite_backend::{RequirementStore, StoreOptions};

use std::path::Path;

use crate::config::Config;
use crate::error::Result;

/// Opens the store at `path` using the options from `config`
pub fn open_with_config(path: &Path, config: &Config) -> Result<RequirementStore> {
    RequirementStore::open(path, config.store_options())
}
