use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::db::RequirementStore;
use crate::error::{Result, ValidationError};
use crate::models::{Requirement, StatusCounts, TraceLink, DATE_FORMAT};

/// Output formats supported by `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "" => Err(ValidationError::MissingField("export format")),
            other => Err(ValidationError::InvalidValue {
                field: "export format",
                value: other.to_string(),
            }),
        }
    }
}

/// Everything in the store at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub requirements: Vec<Requirement>,
    pub trace_links: Vec<TraceLink>,
    pub status_counts: StatusCounts,
}

impl StoreSnapshot {
    pub fn capture(store: &RequirementStore) -> Result<Self> {
        Ok(Self {
            requirements: store.list_requirements()?,
            trace_links: store.list_trace_links(None)?,
            status_counts: store.count_by_status()?,
        })
    }

    /// Targets traced from each source id
    fn targets_by_source(&self) -> BTreeMap<i64, Vec<i64>> {
        let mut targets: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for link in &self.trace_links {
            targets
                .entry(link.requirement_id)
                .or_default()
                .push(link.traced_to);
        }
        targets
    }
}

/// Render a snapshot as pretty-printed JSON
pub fn render_json(snapshot: &StoreSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Render a snapshot as a Markdown traceability report
pub fn render_markdown(snapshot: &StoreSnapshot) -> String {
    let mut output = String::new();
    let counts = &snapshot.status_counts;

    output.push_str("# Requirements Traceability Report\n\n");
    output.push_str(&format!(
        "**Total:** {} | **Pending:** {} | **In Progress:** {} | **Completed:** {}\n\n",
        counts.total(),
        counts.pending,
        counts.in_progress,
        counts.completed
    ));

    if snapshot.requirements.is_empty() {
        output.push_str("No requirements recorded.\n");
        return output;
    }

    let targets = snapshot.targets_by_source();

    output.push_str("| ID | Requirement | Priority | Status | Created | Traced To |\n");
    output.push_str("|---|---|---|---|---|---|\n");
    for req in &snapshot.requirements {
        let traced_to = targets
            .get(&req.id)
            .map(|ids| {
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            req.id,
            escape_cell(&req.text),
            req.priority,
            req.status,
            req.date_created.format(DATE_FORMAT),
            traced_to
        ));
    }

    output
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Export the store in the given format
pub fn export(store: &RequirementStore, format: ExportFormat) -> Result<String> {
    let snapshot = StoreSnapshot::capture(store)?;
    match format {
        ExportFormat::Json => render_json(&snapshot),
        ExportFormat::Markdown => Ok(render_markdown(&snapshot)),
    }
}

/// Export the store to a file
pub fn export_to_file(
    store: &RequirementStore,
    format: ExportFormat,
    output_path: &Path,
) -> Result<()> {
    let content = export(store, format)?;
    fs::write(output_path, content)?;
    log::info!("Exported store as {} to {:?}", format, output_path);
    Ok(())
}
