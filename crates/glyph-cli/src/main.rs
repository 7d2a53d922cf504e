//! Glyph CLI
//!
//! Command-line interface for inspecting the glyph archive and replaying
//! scripted engine sessions.

mod replay;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use glyph_core::archive::default_archive_path;
use glyph_core::{ArchivalStore, ArchiveRecord, EngineConfig, MemoryEngine, DEFAULT_FLUSH_EVERY};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Glyph - Temporal Memory Engine CLI
#[derive(Parser)]
#[command(name = "glyph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the glyph temporal memory engine")]
#[command(long_about = "Glyph stores symbolic records that fade over logical time unless recalled.\n\nThese tools inspect the durable archive of pruned glyphs and replay scripted sessions.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show archive statistics
    Stats {
        /// Archive file (defaults to GLYPH_ARCHIVE_PATH, then the user data dir)
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Print one archived glyph as JSON
    Show {
        /// Glyph id
        id: String,
        /// Archive file (defaults to GLYPH_ARCHIVE_PATH, then the user data dir)
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Export archived glyphs in JSON or JSONL format
    Export {
        /// Output file path
        output: PathBuf,
        /// Export format: json or jsonl
        #[arg(long, default_value = "json")]
        format: String,
        /// Archive file (defaults to GLYPH_ARCHIVE_PATH, then the user data dir)
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Drive an engine from a JSONL event script
    Replay {
        /// Script file, one operation per line
        script: PathBuf,
        /// Archive file for pruned glyphs (in-memory when omitted)
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Embedding dimension
        #[arg(long)]
        dimensions: Option<usize>,
        /// JSON policy file (partial EngineConfig)
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging to stderr (stdout carries command output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    match cli.command {
        Commands::Stats { archive } => run_stats(archive),
        Commands::Show { id, archive } => run_show(id, archive),
        Commands::Export {
            output,
            format,
            archive,
        } => run_export(output, format, archive),
        Commands::Replay {
            script,
            archive,
            dimensions,
            policy,
        } => run_replay(script, archive, dimensions, policy),
    }
}

/// Resolve the archive file: flag, then environment, then the user data dir
fn resolve_archive_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = EngineConfig::from_env()?.archive_path {
        return Ok(path);
    }
    Ok(default_archive_path()?)
}

fn open_archive(flag: Option<PathBuf>) -> anyhow::Result<(PathBuf, ArchivalStore)> {
    let path = resolve_archive_path(flag)?;
    if !path.exists() {
        anyhow::bail!("Archive not found at: {}", path.display());
    }
    let store = ArchivalStore::open(&path, DEFAULT_FLUSH_EVERY);
    Ok((path, store))
}

/// Run stats command
fn run_stats(archive: Option<PathBuf>) -> anyhow::Result<()> {
    let (path, store) = open_archive(archive)?;
    let records: Vec<&ArchiveRecord> = store.records().collect();

    println!("{}", "=== Glyph Archive Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Archive".white().bold(), path.display());
    println!("{}: {}", "Archived Glyphs".white().bold(), records.len());

    if records.is_empty() {
        println!("{}", "No archived glyphs.".dimmed());
        return Ok(());
    }

    let total = records.len();
    let mean_decay = records.iter().map(|r| r.decay_rate).sum::<f64>() / total as f64;
    let mean_age = records
        .iter()
        .map(|r| r.last_resonance_tick.saturating_sub(r.birth_tick) as f64)
        .sum::<f64>()
        / total as f64;
    let with_history = records
        .iter()
        .filter(|r| !r.transformation_history.is_empty())
        .count();

    println!("{}: {:.5}", "Mean Decay Rate".white().bold(), mean_decay);
    println!("{}: {:.1} ticks", "Mean Active Span".white().bold(), mean_age);
    println!("{}: {}", "With Transformations".white().bold(), with_history);

    println!();
    println!("{}", "=== Resonance Distribution ===".yellow().bold());

    for (bucket, count) in resonance_distribution(&records) {
        let bar = ResonanceBar::new(count, total);
        println!(
            "  {:15} [{}] {:>4} ({:>5.1}%)",
            bucket.label(),
            bucket.paint(bar.render()),
            count,
            bar.percentage
        );
    }

    Ok(())
}

/// How often an archived glyph was recalled before it faded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResonanceBucket {
    Never,
    Few,
    Many,
}

impl ResonanceBucket {
    const ALL: [ResonanceBucket; 3] = [Self::Never, Self::Few, Self::Many];

    /// Past five resonances the decay ratchet has engaged
    fn of(resonance_count: u32) -> Self {
        match resonance_count {
            0 => Self::Never,
            1..=5 => Self::Few,
            _ => Self::Many,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Never => "Never (0)",
            Self::Few => "Few (1-5)",
            Self::Many => "Many (>5)",
        }
    }

    fn paint(self, bar: String) -> colored::ColoredString {
        match self {
            Self::Never => bar.red(),
            Self::Few => bar.yellow(),
            Self::Many => bar.green(),
        }
    }
}

fn resonance_distribution(records: &[&ArchiveRecord]) -> [(ResonanceBucket, usize); 3] {
    ResonanceBucket::ALL.map(|bucket| {
        let count = records
            .iter()
            .filter(|r| ResonanceBucket::of(r.resonance_count) == bucket)
            .count();
        (bucket, count)
    })
}

/// Fixed-width share of `total`
struct ResonanceBar {
    filled: usize,
    percentage: f64,
}

impl ResonanceBar {
    const WIDTH: usize = 30;

    fn new(count: usize, total: usize) -> Self {
        let share = if total > 0 { count as f64 / total as f64 } else { 0.0 };
        Self {
            filled: ((share * Self::WIDTH as f64) as usize).min(Self::WIDTH),
            percentage: share * 100.0,
        }
    }

    fn render(&self) -> String {
        format!(
            "{}{}",
            "#".repeat(self.filled),
            "-".repeat(Self::WIDTH - self.filled)
        )
    }
}

/// Run show command
fn run_show(id: String, archive: Option<PathBuf>) -> anyhow::Result<()> {
    let (path, store) = open_archive(archive)?;
    let record = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Glyph {} not found in {}", id, path.display()))?;

    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Run export command - writes archived glyphs in JSON or JSONL format
fn run_export(output: PathBuf, format: String, archive: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "=== Glyph Export ===".cyan().bold());
    println!();

    if format != "json" && format != "jsonl" {
        anyhow::bail!("Invalid format '{}'. Must be 'json' or 'jsonl'.", format);
    }

    let (_, store) = open_archive(archive)?;
    let records: Vec<&ArchiveRecord> = store.records().collect();

    println!("{}: {}", "Format".white().bold(), format);
    println!("{}: {}", "Records".white().bold(), records.len());
    println!();

    write_export(&output, &format, &records)?;

    let file_size = std::fs::metadata(&output)?.len();
    println!(
        "{}",
        format!(
            "Exported {} glyphs to {} ({}, {})",
            records.len(),
            output.display(),
            format,
            size_display(file_size)
        )
        .green()
        .bold()
    );

    Ok(())
}

fn write_export(output: &Path, format: &str, records: &[&ArchiveRecord]) -> anyhow::Result<()> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);

    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.write_all(b"\n")?;
        }
        "jsonl" => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
        }
        other => anyhow::bail!("Invalid format '{}'", other),
    }

    writer.flush()?;
    Ok(())
}

fn size_display(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Build the replay engine configuration from policy file and flags
fn replay_config(
    archive: Option<PathBuf>,
    dimensions: Option<usize>,
    policy: Option<PathBuf>,
) -> anyhow::Result<EngineConfig> {
    let mut config = match policy {
        Some(path) => EngineConfig::from_json_file(&path)?,
        None => EngineConfig::default(),
    };
    if let Some(dimensions) = dimensions {
        config.dimensions = dimensions;
    }
    if archive.is_some() {
        config.archive_path = archive;
    }
    config.validate()?;
    Ok(config)
}

/// Run replay command
fn run_replay(
    script: PathBuf,
    archive: Option<PathBuf>,
    dimensions: Option<usize>,
    policy: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = replay_config(archive, dimensions, policy)?;
    info!(
        dimensions = config.dimensions,
        archive = ?config.archive_path,
        "Replaying {}",
        script.display()
    );

    let file = File::open(&script)
        .map_err(|e| anyhow::anyhow!("Cannot open script {}: {}", script.display(), e))?;

    let mut engine = MemoryEngine::new(config)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = replay::run_script(&mut engine, BufReader::new(file), &mut out)?;
    drop(out);

    let live = engine.len();
    let archived = engine.archive().len();
    engine.close()?;

    eprintln!(
        "{}",
        format!(
            "Replayed {} operations: {} created, {} pruned, {} live, {} archived (last tick {})",
            summary.operations, summary.created, summary.pruned, live, archived, summary.last_tick
        )
        .green()
        .bold()
    );

    Ok(())
}
