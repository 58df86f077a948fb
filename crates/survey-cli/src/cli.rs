//! CLI argument definitions for survey export.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "survey-export",
    version,
    about = "Flatten survey responses into statistical datasets",
    long_about = "Flatten survey responses into one typed row per response.\n\n\
                  Writes CSV, SPSS syntax with tab-delimited data, and a metadata JSON\n\
                  document with labels, value labels and measurement levels."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow free-text answers to appear in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Flatten responses and write the selected outputs.
    Process(ProcessArgs),

    /// List the variables a schema produces.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Survey schema JSON.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Response list JSON.
    #[arg(value_name = "RESPONSES")]
    pub responses: PathBuf,

    /// Output directory (default: the schema's directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Survey id used in file names (default: schema id, else schema file name).
    #[arg(long = "survey-id", value_name = "ID")]
    pub survey_id: Option<String>,

    /// Output format to generate (default: all, or the config file's list).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Widest SPSS string value in bytes before text columns are recoded.
    #[arg(long = "max-string-width", value_name = "BYTES")]
    pub max_string_width: Option<usize>,

    /// Flatten responses on a single thread.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// TOML file with processing options. Flags take precedence.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Survey schema JSON.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Spss,
    Metadata,
    All,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
