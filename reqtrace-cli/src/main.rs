mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

use reqtrace_core::{db, export};
use reqtrace_core::{
    determine_database_path, get_config_path, parse_priority, parse_requirement_id, parse_status,
    parse_target_ids, Config, ExportFormat, Requirement, RequirementPriority, RequirementStatus,
    RequirementStore, StatusCounts, TraceLink, ValidationError,
};

use crate::cli::{Cli, Command};

/// A command whose arguments have been parsed and validated.
///
/// Ids left as `None` are picked interactively once the store is open.
#[derive(Debug, PartialEq)]
enum Action {
    Add {
        text: String,
        priority: RequirementPriority,
    },
    Analyze,
    List,
    Trace {
        source: Option<i64>,
        targets: Option<Vec<i64>>,
    },
    Links {
        source: Option<i64>,
    },
    Status {
        id: Option<i64>,
        status: Option<RequirementStatus>,
    },
    Export {
        format: ExportFormat,
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Bad input must never create or touch the database file
    let action = parse_action(&cli.command)?;

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path()?,
    };
    let config = Config::load_or_default(&config_path)?;

    // Open the store once; it is closed and unlocked when dropped at the end of main
    let db_path = determine_database_path(cli.db.as_deref(), &config);
    let mut store = db::open_with_config(&db_path, &config)
        .with_context(|| format!("Failed to open requirements database {:?}", db_path))?;
    log::info!("Using requirements database {:?}", store.path());

    run_action(&mut store, action)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn parse_action(command: &Command) -> Result<Action> {
    let action = match command {
        Command::Add {
            text,
            priority,
            interactive,
        } => parse_add(text, priority, *interactive)?,
        Command::Analyze => Action::Analyze,
        Command::List => Action::List,
        Command::Trace { source, targets } => Action::Trace {
            source: source.as_deref().map(parse_requirement_id).transpose()?,
            targets: targets.as_deref().map(parse_target_ids).transpose()?,
        },
        Command::Links { source } => Action::Links {
            source: source.as_deref().map(parse_requirement_id).transpose()?,
        },
        Command::Status { id, status } => Action::Status {
            id: id.as_deref().map(parse_requirement_id).transpose()?,
            status: status.as_deref().map(parse_status).transpose()?,
        },
        Command::Export { format, output } => Action::Export {
            format: format.parse()?,
            output: output.clone(),
        },
    };
    Ok(action)
}

fn parse_add(
    text: &Option<String>,
    priority: &Option<String>,
    interactive: bool,
) -> Result<Action> {
    // Default to interactive mode if no specific arguments are provided
    let should_be_interactive = interactive || (text.is_none() && priority.is_none());

    let text = match text {
        Some(t) => t.clone(),
        None if should_be_interactive => prompts::prompt_requirement_text()?,
        None => String::new(),
    };
    if text.trim().is_empty() {
        return Err(ValidationError::MissingField("requirement text").into());
    }

    let priority = match priority {
        Some(p) => parse_priority(p)?,
        None if should_be_interactive => prompts::prompt_priority()?,
        None => return Err(ValidationError::MissingField("priority").into()),
    };

    Ok(Action::Add { text, priority })
}

fn run_action(store: &mut RequirementStore, action: Action) -> Result<()> {
    match action {
        Action::Add { text, priority } => {
            let id = store.create_requirement(&text, Some(priority))?;
            println!(
                "{}",
                format!("Requirement {} added successfully.", id).green()
            );
        }
        Action::Analyze => {
            let counts = store.count_by_status()?;
            println!("{}", format_counts(&counts));
        }
        Action::List => {
            list_requirements(store)?;
        }
        Action::Trace { source, targets } => {
            let source = match source {
                Some(id) => id,
                None => prompts::prompt_requirement_id(
                    "Source requirement:",
                    store.requirement_ids()?,
                )?,
            };
            let targets = match targets {
                Some(ids) => ids,
                None => prompts::prompt_target_ids()?,
            };
            trace_requirements(store, source, &targets)?;
        }
        Action::Links { source } => {
            list_links(store, source)?;
        }
        Action::Status { id, status } => {
            let id = match id {
                Some(id) => id,
                None => prompts::prompt_requirement_id("Requirement:", store.requirement_ids()?)?,
            };
            let status = match status {
                Some(status) => status,
                None => prompts::prompt_status()?,
            };
            update_status(store, id, status)?;
        }
        Action::Export { format, output } => {
            handle_export_command(store, format, output.as_deref())?;
        }
    }
    Ok(())
}

fn list_requirements(store: &RequirementStore) -> Result<()> {
    let requirements = store.list_requirements()?;
    if requirements.is_empty() {
        println!("No requirements found.");
        return Ok(());
    }

    println!("{}", format_requirement_table(&requirements));
    Ok(())
}

fn trace_requirements(
    store: &mut RequirementStore,
    source_id: i64,
    target_ids: &[i64],
) -> Result<()> {
    let inserted = store
        .link_traced(source_id, target_ids)
        .map_err(|e| {
            if e.is_conflict() {
                anyhow::Error::new(e).context("No traceability relationships were added")
            } else {
                e.into()
            }
        })?;

    println!(
        "{}",
        format!(
            "Traceability relationships added successfully ({} link(s)).",
            inserted
        )
        .green()
    );
    Ok(())
}

fn list_links(store: &RequirementStore, source_id: Option<i64>) -> Result<()> {
    let links = store.list_trace_links(source_id)?;
    if links.is_empty() {
        println!("No trace links found.");
        return Ok(());
    }

    println!("{}", format_links(&links));
    Ok(())
}

fn update_status(store: &RequirementStore, id: i64, status: RequirementStatus) -> Result<()> {
    if store.update_status(id, status)? == 0 {
        println!(
            "{}",
            format!("No requirement with id {}; nothing was changed.", id).yellow()
        );
    } else {
        println!(
            "{}",
            format!("Status of Requirement {} updated to {}.", id, status).green()
        );
    }
    Ok(())
}

fn handle_export_command(
    store: &RequirementStore,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            export::export_to_file(store, format, path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            println!(
                "{}",
                format!("Exported {} report to {}", format, path.display()).green()
            );
        }
        None => {
            println!("{}", export::export(store, format)?);
        }
    }
    Ok(())
}

fn format_counts(counts: &StatusCounts) -> String {
    [
        RequirementStatus::Pending,
        RequirementStatus::Completed,
        RequirementStatus::InProgress,
    ]
    .iter()
    .map(|status| format!("{} Requirements: {}", status, counts.get(*status)))
    .collect::<Vec<_>>()
    .join("\n")
}

fn colored_status(status: RequirementStatus) -> colored::ColoredString {
    match status {
        RequirementStatus::Pending => status.as_str().yellow(),
        RequirementStatus::InProgress => status.as_str().blue(),
        RequirementStatus::Completed => status.as_str().green(),
    }
}

fn format_requirement_table(requirements: &[Requirement]) -> String {
    let text_width = requirements
        .iter()
        .map(|r| r.text.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(4, 60);

    let mut lines = vec![format!(
        "{:<6} {:<text_width$} {:<8} {}",
        "ID".bold(),
        "Text".bold(),
        "Priority".bold(),
        "Status".bold(),
    )];

    for req in requirements {
        lines.push(format!(
            "{:<6} {:<text_width$} {:<8} {}",
            req.id,
            truncate(&req.text, text_width),
            req.priority.as_str(),
            colored_status(req.status),
        ));
    }

    lines.join("\n")
}

fn format_links(links: &[TraceLink]) -> String {
    links
        .iter()
        .map(|link| format!("{} {} {}", link.requirement_id, "->".dimmed(), link.traced_to))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
