use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Record software requirements, track their status and trace them to each other"
)]
pub struct Cli {
    /// Path to the requirements database (overrides REQTRACE_DB and the config file)
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.reqtrace.yaml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a new requirement (status starts as Pending)
    Add {
        /// Requirement text
        #[clap(long)]
        text: Option<String>,

        /// Priority: High, Medium or Low
        #[clap(long)]
        priority: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Show how many requirements are in each status
    Analyze,

    /// List all requirements
    List,

    /// Trace a requirement to one or more other requirements
    ///
    /// Prompts for any argument that is left out.
    Trace {
        /// Id of the source requirement
        source: Option<String>,

        /// Comma-separated ids of the traced requirements, e.g. "2,5,7"
        targets: Option<String>,
    },

    /// List recorded trace links
    Links {
        /// Only show links leaving this requirement
        #[clap(long)]
        source: Option<String>,
    },

    /// Change the status of a requirement
    ///
    /// Prompts for any argument that is left out.
    Status {
        /// Id of the requirement
        id: Option<String>,

        /// New status: Pending, "In Progress" or Completed
        status: Option<String>,
    },

    /// Export requirements and trace links
    Export {
        /// Output format: json or markdown
        #[clap(long, default_value = "json")]
        format: String,

        /// Write to this file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}
