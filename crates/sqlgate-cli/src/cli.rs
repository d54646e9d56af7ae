use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Connection to use instead of the configured default
    #[arg(short = 'C', long, global = true)]
    pub connection: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query and print the returned rows
    #[command(arg_required_else_help = true)]
    #[clap(name = "query", visible_alias = "q")]
    Query {
        /// SQL text with `?` placeholders
        #[arg(required = true)]
        sql: String,

        /// Values for the placeholders, in order
        #[arg(allow_negative_numbers = true)]
        params: Vec<String>,
    },

    /// Run a statement and print the number of affected rows
    #[command(arg_required_else_help = true)]
    Exec {
        /// SQL text with `?` placeholders
        #[arg(required = true)]
        sql: String,

        /// Values for the placeholders, in order
        #[arg(allow_negative_numbers = true)]
        params: Vec<String>,
    },

    /// Print one page of a table
    #[command(arg_required_else_help = true)]
    #[clap(name = "rows", visible_alias = "ls")]
    Rows {
        /// Table name
        #[arg(required = true)]
        table: String,

        /// Filter clause appended after the table, e.g. "WHERE views > ?"
        #[arg(short, long)]
        filter: Option<String>,

        /// Values for the filter placeholders, in order
        #[arg(allow_negative_numbers = true)]
        params: Vec<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u64,

        /// Rows per page [default: from config]
        #[arg(long)]
        per_page: Option<u64>,

        /// Columns to select
        #[arg(short, long)]
        select: Option<String>,
    },

    /// Insert one row
    #[command(arg_required_else_help = true)]
    #[clap(name = "insert", visible_alias = "add")]
    Insert {
        /// Table name
        #[arg(required = true)]
        table: String,

        /// Column values as COLUMN=VALUE
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<String>,

        /// Assignments applied when the row already exists, as COLUMN=VALUE
        #[arg(long = "on-duplicate", value_name = "COLUMN=VALUE")]
        on_duplicate: Vec<String>,
    },

    /// Delete rows by primary key or by clause
    #[command(arg_required_else_help = true)]
    #[clap(name = "delete", visible_alias = "rm")]
    Delete {
        /// Table name
        #[arg(required = true)]
        table: String,

        /// Primary key value, or a clause such as "WHERE id > 10"
        #[arg(required = true, allow_negative_numbers = true)]
        target: String,

        /// Primary key column
        #[arg(long, default_value = "id")]
        primary_key: String,
    },

    /// List configured connections
    #[clap(name = "connections", visible_alias = "conn")]
    Connections,
}
