use std::fs;
use std::path::Path;

use anyhow::Context;
use cfgpatch_crypto::ContentHasher;
use cfgpatch_diff::parse_kind;
use cfgpatch_sdk::{migrate, MigrationReport, PatchService, MIGRATION_MARKER};
use cfgpatch_store::{BaselineProvider, DirectoryBaselines, FileSnapshotStore, InMemoryBaselines};
use cfgpatch_types::{ApplyEnvelope, Conflict, DiffEnvelope, FieldChange, Kind, SkipCounts};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    let format = cli.format;
    let baseline_dir = cli.baseline_dir.unwrap_or_else(|| config.baseline_dir.clone());
    debug!(baseline_dir = %baseline_dir.display(), "resolved baseline directory");
    match cli.command {
        Command::Kinds => cmd_kinds(format),
        Command::Diff(args) => cmd_diff(args, &baseline_dir, format),
        Command::Apply(args) => cmd_apply(args, &baseline_dir, format),
        Command::Fingerprint(args) => cmd_fingerprint(args, format),
        Command::Migrate(args) => cmd_migrate(args, &baseline_dir, &config, format),
    }
}

fn cmd_kinds(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let rows: Vec<Value> = Kind::ALL
            .iter()
            .map(|kind| {
                let shape = kind.shape();
                json!({
                    "kind": kind.as_str(),
                    "mode": shape.mode(),
                    "listKey": shape.list_key(),
                    "baselineFile": kind.baseline_file(),
                    "shareKey": kind.share_key(),
                })
            })
            .collect();
        return print_json(&rows);
    }

    for kind in Kind::ALL {
        let shape = kind.shape();
        println!(
            "{} {:<12} {:<8} {}",
            format!("{:<12}", kind.as_str()).bold(),
            shape.mode().to_string(),
            shape.list_key().unwrap_or("-"),
            kind.baseline_file().dimmed(),
        );
    }
    Ok(())
}

fn cmd_diff(args: DiffArgs, baseline_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let provider = baseline_provider(&args.kind, args.baseline.as_deref(), baseline_dir)?;
    let edited = read_json(&args.edited)?;
    let envelope = PatchService::new(provider).diff(&args.kind, &edited)?;

    if let Some(out) = &args.out {
        write_json(out, &envelope)?;
    }
    match format {
        OutputFormat::Json => print_json(&envelope),
        OutputFormat::Text => {
            print_diff(&envelope);
            Ok(())
        }
    }
}

fn cmd_apply(args: ApplyArgs, baseline_dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let patch = read_json(&args.patch)?;
    let target = args.target.as_deref().map(read_json).transpose()?;
    let service = PatchService::new(DirectoryBaselines::new(baseline_dir));
    let outcome = service.apply(&args.kind, &patch, target)?;

    let skipped = outcome.skipped;
    let envelope = outcome.into_envelope();
    if let Some(out) = &args.out {
        write_json(out, &envelope)?;
    }
    match format {
        OutputFormat::Json => print_json(&envelope),
        OutputFormat::Text => {
            print_apply(&envelope, &skipped);
            Ok(())
        }
    }
}

fn cmd_fingerprint(args: FingerprintArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dataset = read_json(&args.file)?;
    let digest = ContentHasher::fingerprint(&dataset)?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "file": args.file.display().to_string(),
            "sha256": digest,
        })),
        OutputFormat::Text => {
            println!("{}  {}", digest, args.file.display());
            Ok(())
        }
    }
}

fn cmd_migrate(
    args: MigrateArgs,
    baseline_dir: &Path,
    config: &CliConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let share_dir = args.share_dir.unwrap_or_else(|| config.share_dir.clone());
    let store = FileSnapshotStore::open(&share_dir)
        .with_context(|| format!("opening share directory {}", share_dir.display()))?;
    let report = migrate(&store, &DirectoryBaselines::new(baseline_dir))?;

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print_migration(&report);
            Ok(())
        }
    }
}

fn baseline_provider(
    kind: &str,
    file: Option<&Path>,
    dir: &Path,
) -> anyhow::Result<Box<dyn BaselineProvider>> {
    match file {
        Some(file) => {
            let kind = parse_kind(kind)?;
            Ok(Box::new(InMemoryBaselines::new().with(kind, read_json(file)?)))
        }
        None => Ok(Box::new(DirectoryBaselines::new(dir))),
    }
}

fn print_diff(envelope: &DiffEnvelope) {
    let changes = &envelope.changes;
    let short_sha: String = envelope.meta.base_sha256.chars().take(12).collect();
    println!(
        "Diff for {} against {} (schema {})",
        envelope.meta.kind.to_string().bold(),
        short_sha.yellow(),
        envelope.meta.schema
    );
    for add in &changes.adds {
        println!("  {} {}", "+".green().bold(), add.id);
    }
    for update in &changes.updates {
        println!("  {} {}", "~".yellow().bold(), update.id);
        for (field, change) in &update.fields {
            println!("      {}: {}", field.cyan(), describe_change(change));
        }
    }
    for delete in &changes.deletes {
        println!("  {} {}", "-".red().bold(), delete.id);
    }
    if changes.is_empty() {
        println!("{}", "No changes.".dimmed());
    } else {
        println!(
            "{} added, {} updated, {} deleted",
            changes.adds.len(),
            changes.updates.len(),
            changes.deletes.len()
        );
    }
}

fn describe_change(change: &FieldChange) -> String {
    let show = |v: &Option<Value>| match v {
        Some(v) => v.to_string(),
        None => "(absent)".into(),
    };
    format!("{} -> {}", show(&change.from), show(&change.to))
}

fn print_apply(envelope: &ApplyEnvelope, skipped: &SkipCounts) {
    let stats = &envelope.stats;
    let mark = if envelope.conflicts.is_empty() { "✓".green().bold() } else { "!".yellow().bold() };
    println!(
        "{} Applied: {} added, {} fields updated, {} deleted",
        mark, stats.adds_applied, stats.updates_applied, stats.deletes_applied
    );
    for conflict in &envelope.conflicts {
        match conflict {
            Conflict::Field { id, field, current, expected } => println!(
                "  {} {}.{}: current {}, expected {}",
                "conflict".red(),
                id,
                field.cyan(),
                current,
                expected
            ),
            other => println!("  {} {}", other.kind().red(), other.id()),
        }
    }
    if !skipped.is_empty() {
        println!(
            "  {} {} malformed entries ignored",
            "skipped".dimmed(),
            skipped.total()
        );
    }
}

fn print_migration(report: &MigrationReport) {
    if report.already_done {
        println!("Migration already done ({}).", MIGRATION_MARKER.dimmed());
        return;
    }
    println!(
        "{} Migrated {} packages ({} already patch form, {} failed)",
        "✓".green().bold(),
        report.migrated,
        report.skipped,
        if report.failed == 0 { report.failed.to_string().normal() } else { report.failed.to_string().red() }
    );
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
