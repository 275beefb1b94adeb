use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cfgpatch",
    about = "Entity-level diff and patch for game configuration datasets",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (default: ./cfgpatch.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding one baseline file per kind
    #[arg(long, global = true)]
    pub baseline_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List supported kinds and their dataset shapes
    Kinds,
    /// Diff an edited dataset against the baseline
    Diff(DiffArgs),
    /// Apply a change set to a dataset
    Apply(ApplyArgs),
    /// Print the content fingerprint of a dataset
    Fingerprint(FingerprintArgs),
    /// Rewrite legacy share packages as change sets
    Migrate(MigrateArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    #[arg(short, long)]
    pub kind: String,
    /// Edited dataset (JSON)
    pub edited: PathBuf,
    /// Diff against this file instead of the baseline directory
    #[arg(long)]
    pub baseline: Option<PathBuf>,
    /// Write the diff envelope here
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[arg(short, long)]
    pub kind: String,
    /// Change set or diff envelope (JSON)
    pub patch: PathBuf,
    /// Dataset to patch (default: the baseline)
    #[arg(long)]
    pub target: Option<PathBuf>,
    /// Write the apply envelope here
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct FingerprintArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct MigrateArgs {
    #[arg(long)]
    pub share_dir: Option<PathBuf>,
}
