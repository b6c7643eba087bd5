pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod input;
pub mod models;

// Re-export commonly used types
pub use config::{determine_database_path, get_config_path, Config};
pub use db::{RequirementStore, StoreOptions};
pub use error::{ConfigError, StoreError, ValidationError};
pub use export::{ExportFormat, StoreSnapshot};
pub use input::{parse_priority, parse_requirement_id, parse_status, parse_target_ids};
pub use models::{
    Requirement, RequirementPriority, RequirementStatus, StatusCounts, TraceLink, DATE_FORMAT,
};
