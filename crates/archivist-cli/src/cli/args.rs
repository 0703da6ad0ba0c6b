use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::Verbosity;

#[derive(Parser, Debug)]
#[command(
    name = "archivist",
    version,
    about = "Build category archives and a verifiable manifest from a curated catalog"
)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "ARCHIVIST_CONFIG",
        default_value = "archivist.yaml"
    )]
    pub config: PathBuf,

    /// Log debug detail (per-entry progress)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every archive and write the manifest
    Build(BuildArgs),
    /// Show the archives a build would produce, without writing anything
    Plan(PlanArgs),
    /// Re-hash built archives and compare them with the manifest
    Verify(VerifyArgs),
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Override the configured output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Date stamped into archive names, YYYYMMDD (default: today, local time)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Date used for the listed archive names, YYYYMMDD (default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Manifest to check (default: configured output_dir/manifest file)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Directory holding the archives (default: the manifest's directory)
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| format!("expected YYYYMMDD, got {:?}: {}", s, e))
}
