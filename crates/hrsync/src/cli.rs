//! Clap derive structures for the `hrsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hrsync -- command-line console for the HR service
#[derive(Debug, Parser)]
#[command(
    name = "hrsync",
    version,
    about = "Browse and edit HR records from the command line",
    long_about = "A console for the HR service: employees, departments and attendance\n\
        records, spreadsheet import/export, and connection management.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API base address (overrides the saved preference)
    #[arg(long, short = 'a', env = "HRSYNC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides the keyring)
    #[arg(long, env = "HRSYNC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "HRSYNC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HRSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Directory receiving exported spreadsheets
    #[arg(long, env = "HRSYNC_EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage employee records
    #[command(alias = "emp", alias = "e")]
    Employees(EmployeesArgs),

    /// Manage departments
    #[command(alias = "dept", alias = "d")]
    Departments(DepartmentsArgs),

    /// Manage attendance records
    #[command(alias = "att", alias = "a")]
    Attendances(AttendancesArgs),

    /// Show the reachability of every capability
    Status,

    /// Re-probe every capability and refresh every collection
    Reconnect,

    /// Manage saved preferences and the stored token
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared record commands ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List every record
    #[command(alias = "ls")]
    List,

    /// Fetch one record from the server
    Get {
        /// Record id
        id: i64,
    },

    /// Create a record from a JSON payload
    Create {
        /// JSON payload, or @path to read it from a file
        #[arg(long, short = 'd')]
        data: String,
    },

    /// Update fields of a record from a JSON payload
    Update {
        /// Record id
        id: i64,

        /// JSON payload, or @path to read it from a file
        #[arg(long, short = 'd')]
        data: String,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    /// Upload a spreadsheet and reload the collection
    Import {
        /// Spreadsheet to upload
        path: PathBuf,
    },

    /// Download the collection as a spreadsheet
    Export,
}

// ── Employees ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EmployeesArgs {
    #[command(subcommand)]
    pub command: TransferableCommand,
}

// ── Departments ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DepartmentsArgs {
    #[command(subcommand)]
    pub command: TransferableCommand,
}

#[derive(Debug, Subcommand)]
pub enum TransferableCommand {
    #[command(flatten)]
    Record(RecordCommand),

    #[command(flatten)]
    Transfer(TransferCommand),
}

// ── Attendances ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AttendancesArgs {
    #[command(subcommand)]
    pub command: AttendancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum AttendancesCommand {
    #[command(flatten)]
    Record(RecordCommand),

    /// Records of one employee, optionally on one day
    ByEmployee {
        /// Employee id
        employee_id: i64,

        /// Restrict to one day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Records between two days, inclusive (YYYY-MM-DD)
    Range {
        start: NaiveDate,
        end: NaiveDate,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective preferences
    Show,

    /// Print the preferences file path
    Path,

    /// Test an API address and save it
    SetUrl {
        /// API base address, e.g. localhost:5171/api
        url: String,

        /// Save without testing the connection
        #[arg(long)]
        no_test: bool,
    },

    /// Restore the default API address
    ResetUrl,

    /// Store a bearer token in the system keyring
    SetToken {
        /// Token value (prompted for when omitted)
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove the stored bearer token
    ClearToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
