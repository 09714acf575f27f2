//! CLI argument parsing for the report tool.
//!
//! Commands read recorded report data from disk; nothing here runs images.
use crate::render::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mlreport",
    version,
    about = "Summarise manylinux image reports across architectures",
    after_help = "Examples:\n  mlreport parse-name quay.io/pypa/manylinux2014_x86_64\n  mlreport report data/reports/manylinux2014_x86_64.json\n  mlreport version --id quay.io/pypa/manylinux_2_28:2024-06-01-abc1234 --differences\n  mlreport search latest\n  mlreport commands report.json --failed",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to MLREPORT_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format; overrides the config file
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log debug detail to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    ParseName(ParseNameArgs),
    Report(ReportArgs),
    Version(VersionArgs),
    Search(SearchArgs),
    Commands(CommandsArgs),
    /// List the known platform standards, newest first
    Standards,
}

/// Split a repository name or image reference into its parts.
#[derive(Parser, Debug)]
#[command(about = "Parse domain/org/name[_arch][:tag]")]
pub struct ParseNameArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Parser, Debug)]
#[command(about = "Show the fields extracted from one image report")]
pub struct ReportArgs {
    /// Per-image report JSON
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Summarise one version across its architectures")]
pub struct VersionArgs {
    /// Version JSON with reports_by_arch
    #[arg(value_name = "FILE", required_unless_present = "id", conflicts_with = "id")]
    pub path: Option<PathBuf>,

    /// Version id (domain/org/name:tag) looked up under the data dir
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Only show fields that differ between architectures
    #[arg(long)]
    pub differences: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Search the versions index")]
pub struct SearchArgs {
    /// Comma-separated substrings, or `latest` / `all`
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Index file; defaults to index.json under the data dir
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "List the commands recorded in an image report")]
pub struct CommandsArgs {
    /// Per-image report JSON
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Only list commands that exited non-zero
    #[arg(long)]
    pub failed: bool,
}
