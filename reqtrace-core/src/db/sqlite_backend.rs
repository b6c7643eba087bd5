//! SQLite requirement store
//!
//! The store owns a single connection for its whole lifetime. Callers open it
//! once at startup and pass it by reference to every operation; dropping it
//! closes the connection and releases the instance lock.

use chrono::{Local, NaiveDateTime};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError, ValidationError};
use crate::models::{
    Requirement, RequirementPriority, RequirementStatus, StatusCounts, TraceLink, DATE_FORMAT,
};

use super::lock::InstanceLock;

const REQUIREMENT_COLUMNS: &str = "id, text, priority, date_created, status";

/// Options controlling how the store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject trace links naming requirements that do not exist
    pub enforce_references: bool,
    /// Enable write-ahead logging (file-backed stores only)
    pub wal_mode: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            enforce_references: true,
            wal_mode: false,
        }
    }
}

/// Persistent store of requirements and their trace links
pub struct RequirementStore {
    // Declared before the lock so the connection closes first on drop.
    conn: Connection,
    path: Option<PathBuf>,
    options: StoreOptions,
    _lock: Option<InstanceLock>,
}

impl RequirementStore {
    /// Opens (creating if needed) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock = InstanceLock::acquire(&path)?;
        let conn = Connection::open(&path)?;
        if options.wal_mode {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }

        let store = Self::with_connection(conn, Some(path.clone()), options, Some(lock))?;
        log::info!("Opened requirement store {:?}", path);
        Ok(store)
    }

    /// Opens a private in-memory store
    pub fn open_in_memory(options: StoreOptions) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None, options, None)
    }

    fn with_connection(
        conn: Connection,
        path: Option<PathBuf>,
        options: StoreOptions,
        lock: Option<InstanceLock>,
    ) -> Result<Self> {
        let pragma = if options.enforce_references {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA foreign_keys=OFF;"
        };
        conn.execute_batch(pragma)?;

        let store = Self {
            conn,
            path,
            options,
            _lock: lock,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates any missing tables; existing tables are left untouched
    fn init_schema(&self) -> Result<()> {
        log::debug!("Ensuring requirement store schema");
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records a new requirement with status `Pending` and returns its id
    ///
    /// Empty (or whitespace-only) text and a missing priority are rejected
    /// before the database is touched.
    pub fn create_requirement(
        &self,
        text: &str,
        priority: Option<RequirementPriority>,
    ) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(ValidationError::MissingField("requirement text").into());
        }
        let priority = priority.ok_or(ValidationError::MissingField("priority"))?;

        let date_created = Local::now().format(DATE_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO requirements (text, priority, date_created, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                text,
                priority.as_str(),
                date_created,
                RequirementStatus::Pending.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        log::info!("Requirement {} added ({} priority)", id, priority);
        Ok(id)
    }

    /// Counts requirements in each status
    ///
    /// The three counts are separate queries and are not taken from one snapshot.
    pub fn count_by_status(&self) -> Result<StatusCounts> {
        let counts = StatusCounts {
            pending: self.count_status(RequirementStatus::Pending)?,
            in_progress: self.count_status(RequirementStatus::InProgress)?,
            completed: self.count_status(RequirementStatus::Completed)?,
        };
        log::debug!("Status counts: {:?}", counts);
        Ok(counts)
    }

    fn count_status(&self, status: RequirementStatus) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM requirements WHERE status = ?1",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Records that `source_id` was traced to every id in `target_ids`
    ///
    /// All links are inserted in one exclusive transaction. If any pair
    /// already exists (including a repeat inside `target_ids`) the whole batch
    /// is rolled back and `IntegrityConflict` names the first offending pair.
    /// Returns the number of links inserted.
    pub fn link_traced(&mut self, source_id: i64, target_ids: &[i64]) -> Result<usize> {
        if target_ids.is_empty() {
            return Err(ValidationError::EmptyTargetList.into());
        }

        let enforce_references = self.options.enforce_references;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Exclusive)?;

        match insert_links(&tx, source_id, target_ids, enforce_references) {
            Ok(inserted) => {
                tx.commit()?;
                log::info!(
                    "Traced requirement {} to {} requirement(s)",
                    source_id,
                    inserted
                );
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    log::error!("Rollback of trace batch failed: {}", rollback_err);
                }
                log::warn!("Trace batch for requirement {} rolled back: {}", source_id, e);
                Err(e)
            }
        }
    }

    /// Sets the status of a requirement
    ///
    /// An unknown id is not an error; the returned row count is simply 0.
    pub fn update_status(&self, id: i64, status: RequirementStatus) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE requirements SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;

        if changed == 0 {
            log::warn!("Status update matched no requirement with id {}", id);
        } else {
            log::info!("Requirement {} status set to {}", id, status);
        }
        Ok(changed)
    }

    /// Lists all requirements ordered by id
    pub fn list_requirements(&self) -> Result<Vec<Requirement>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM requirements ORDER BY id",
            REQUIREMENT_COLUMNS
        ))?;
        let requirements = stmt
            .query_map([], row_to_requirement)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requirements)
    }

    /// Gets a requirement by id
    pub fn get_requirement(&self, id: i64) -> Result<Option<Requirement>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM requirements WHERE id = ?1",
                    REQUIREMENT_COLUMNS
                ),
                [id],
                row_to_requirement,
            )
            .optional()
            .map_err(StoreError::from)
    }

    /// Ids of all requirements, ascending
    pub fn requirement_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM requirements ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Lists trace links, optionally only those leaving `source_id`
    ///
    /// Rows whose ids are not integers (older files stored ids as typed) are
    /// skipped with a warning.
    pub fn list_trace_links(&self, source_id: Option<i64>) -> Result<Vec<TraceLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT requirement_id, traced_to FROM traceability_matrix",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, Value>(0)?, row.get::<_, Value>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut links = Vec::with_capacity(rows.len());
        for (raw_source, raw_target) in rows {
            match (link_id(&raw_source), link_id(&raw_target)) {
                (Some(requirement_id), Some(traced_to)) => {
                    if source_id.map_or(true, |id| id == requirement_id) {
                        links.push(TraceLink {
                            requirement_id,
                            traced_to,
                        });
                    }
                }
                _ => log::warn!(
                    "Skipping trace link with non-integer ids ({:?}, {:?})",
                    raw_source,
                    raw_target
                ),
            }
        }

        links.sort();
        Ok(links)
    }
}

/// Reads a trace link id column, accepting integers and numeric text
fn link_id(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(id) => Some(*id),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn insert_links(
    conn: &Connection,
    source_id: i64,
    target_ids: &[i64],
    enforce_references: bool,
) -> Result<usize> {
    if enforce_references {
        for &id in std::iter::once(&source_id).chain(target_ids) {
            if !requirement_exists(conn, id)? {
                return Err(ValidationError::UnknownRequirement(id).into());
            }
        }
    }

    let mut stmt = conn.prepare(
        "INSERT INTO traceability_matrix (requirement_id, traced_to) VALUES (?1, ?2)",
    )?;
    for &target_id in target_ids {
        match stmt.execute(params![source_id, target_id]) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(StoreError::IntegrityConflict {
                    source_id,
                    target_id,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(target_ids.len())
}

fn requirement_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM requirements WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn row_to_requirement(row: &Row<'_>) -> rusqlite::Result<Requirement> {
    let id: i64 = row.get(0)?;
    let text: String = row.get(1)?;
    let priority_str: String = row.get(2)?;
    let date_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;

    let date_created = NaiveDateTime::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let priority = match priority_str.as_str() {
        "High" => RequirementPriority::High,
        "Medium" => RequirementPriority::Medium,
        "Low" => RequirementPriority::Low,
        other => {
            log::warn!("Requirement {} has unknown priority '{}'", id, other);
            RequirementPriority::Medium
        }
    };

    let status = RequirementStatus::from_column(&status_str).unwrap_or_else(|| {
        log::warn!("Requirement {} has unknown status '{}'", id, status_str);
        RequirementStatus::Pending
    });

    Ok(Requirement {
        id,
        text,
        priority,
        date_created,
        status,
    })
}
