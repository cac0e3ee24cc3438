//! `items` and `partners` query commands

pub mod handler;

use clap::{Args, Subcommand, ValueEnum};

/// Which sample resource a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Items,
    Partners,
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommands {
    /// List rows matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Maximum number of rows
        #[arg(long)]
        top: Option<u32>,

        /// Rows to skip
        #[arg(long)]
        skip: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch one row by its code
    Get {
        code: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Count rows matching the filters
    Count {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the request URI instead of sending it
        #[arg(long)]
        dry: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only codes starting with this prefix
    #[arg(long)]
    pub code_prefix: Option<String>,

    /// Only names containing this text
    #[arg(long)]
    pub name_contains: Option<String>,

    /// Only rows created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub created_since: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print the request URI instead of sending it
    #[arg(long)]
    pub dry: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonCompact,
    Csv,
}
