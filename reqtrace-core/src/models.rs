use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used for `date_created` in the database (local time, second precision)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents the priority of a requirement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequirementPriority {
    High,
    Medium,
    Low,
}

impl RequirementPriority {
    pub const ALL: [RequirementPriority; 3] = [
        RequirementPriority::High,
        RequirementPriority::Medium,
        RequirementPriority::Low,
    ];

    /// Returns the string stored in the `priority` column
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementPriority::High => "High",
            RequirementPriority::Medium => "Medium",
            RequirementPriority::Low => "Low",
        }
    }
}

impl fmt::Display for RequirementPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the lifecycle status of a requirement
///
/// Any status may move to any other status; there is no enforced ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequirementStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl RequirementStatus {
    pub const ALL: [RequirementStatus; 3] = [
        RequirementStatus::Pending,
        RequirementStatus::InProgress,
        RequirementStatus::Completed,
    ];

    /// Returns the string stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Pending => "Pending",
            RequirementStatus::InProgress => "In Progress",
            RequirementStatus::Completed => "Completed",
        }
    }

    /// Maps a stored column value back to a status, if it is one of the known values
    pub fn from_column(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single requirement record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Surrogate key assigned by the store, never reused
    pub id: i64,

    /// Free-form requirement text
    pub text: String,

    pub priority: RequirementPriority,

    /// Creation time, set once by the store
    pub date_created: NaiveDateTime,

    pub status: RequirementStatus,
}

/// A directed "traced to" link between two requirements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceLink {
    pub requirement_id: i64,
    pub traced_to: i64,
}

impl fmt::Display for TraceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.requirement_id, self.traced_to)
    }
}

/// Number of requirements in each status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

impl StatusCounts {
    pub fn get(&self, status: RequirementStatus) -> u64 {
        match status {
            RequirementStatus::Pending => self.pending,
            RequirementStatus::InProgress => self.in_progress,
            RequirementStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.completed
    }
}
