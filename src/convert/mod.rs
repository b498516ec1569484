//! Converting SQL Server scripts into PostgreSQL scripts.
//!
//! A script is split into `GO` batches, each batch runs through the rewrite
//! [`Pipeline`], and the results are written back `;`-terminated:
//! - Input may be gzip, bzip2, xz or zstd compressed
//! - Output goes to a file, stdout, or nowhere (dry run)
//! - Per-rule substitution counts and warnings are returned as [`ConvertStats`]

mod compression;
mod config;

pub use compression::Compression;
pub use config::PipelineYamlConfig;

use crate::batch::{split_batches, terminate};
use crate::rewrite::{Pipeline, RewriteWarning, RuleCount, WarningCollector};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Configuration for the convert command
#[derive(Debug)]
pub struct ConvertConfig {
    /// Input SQL script
    pub input: PathBuf,
    /// Output SQL file (None for stdout)
    pub output: Option<PathBuf>,
    /// Rules to apply, in order
    pub pipeline: Pipeline,
    /// Dry run mode
    pub dry_run: bool,
    /// Show progress
    pub progress: bool,
    /// Write the comment header
    pub header: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            pipeline: Pipeline::default(),
            dry_run: false,
            progress: false,
            header: true,
        }
    }
}

/// Statistics from convert operation
#[derive(Debug, Default, Serialize)]
pub struct ConvertStats {
    /// Batches read from the script
    pub batches_processed: u64,
    /// Batches where at least one rule matched
    pub batches_converted: u64,
    /// Batches passed through unchanged
    pub batches_unchanged: u64,
    /// Substitutions per rule, in pipeline order
    pub substitutions: Vec<RuleCount>,
    /// Warnings generated, deduplicated and capped
    #[serde(flatten)]
    pub warnings: WarningCollector,
}

impl ConvertStats {
    pub fn total_substitutions(&self) -> usize {
        self.substitutions.iter().map(|c| c.substitutions).sum()
    }
}

/// Runs a pipeline over successive batches and accumulates its reports
pub struct Converter {
    pipeline: Pipeline,
    counts: Vec<RuleCount>,
    warnings: WarningCollector,
}

impl Converter {
    pub fn new(pipeline: Pipeline) -> Self {
        let counts = pipeline
            .rules()
            .iter()
            .map(|&rule| RuleCount {
                rule,
                substitutions: 0,
            })
            .collect();
        Self {
            pipeline,
            counts,
            warnings: WarningCollector::new(),
        }
    }

    /// Rewrite one batch
    pub fn convert_batch(&mut self, batch: &str) -> String {
        let output = self.pipeline.run(batch);
        for (total, count) in self.counts.iter_mut().zip(&output.counts) {
            total.substitutions += count.substitutions;
        }
        self.warnings.extend(output.warnings);
        output.text
    }

    pub fn counts(&self) -> &[RuleCount] {
        &self.counts
    }

    pub fn warnings(&self) -> &[RewriteWarning] {
        self.warnings.warnings()
    }

    /// Move the accumulated counts and warnings into `stats`
    pub fn finish(self, stats: &mut ConvertStats) {
        stats.substitutions = self.counts;
        stats.warnings = self.warnings;
    }
}

/// Rewrite a whole script in memory, batch by batch.
pub fn convert_script(pipeline: &Pipeline, script: &str) -> (String, ConvertStats) {
    let mut converter = Converter::new(pipeline.clone());
    let mut out = String::with_capacity(script.len());
    let mut stats = ConvertStats::default();

    for batch in split_batches(script) {
        let converted = convert_one(&mut converter, batch.text, &mut stats);
        out.push_str(&terminate(&converted));
        out.push_str("\n\n");
    }

    converter.finish(&mut stats);
    (out, stats)
}

fn convert_one(converter: &mut Converter, batch: &str, stats: &mut ConvertStats) -> String {
    stats.batches_processed += 1;
    let converted = converter.convert_batch(batch);
    if converted == batch {
        stats.batches_unchanged += 1;
    } else {
        stats.batches_converted += 1;
    }
    converted
}

/// Read a script, decompressing it if needed
pub fn read_script(path: &Path) -> anyhow::Result<String> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let compression = Compression::from_path(path);
    let mut reader = compression
        .wrap_reader(Box::new(file))
        .with_context(|| format!("failed to open {} as {}", path.display(), compression))?;

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read {}", path.display()))?;

    decode_script(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

/// Decode script bytes as UTF-8, or as UTF-16 when a byte order mark says so.
///
/// SQL Server tools script objects as UTF-16LE with a BOM by default.
pub fn decode_script(bytes: &[u8]) -> anyhow::Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => utf8(bytes),
    }
}

fn utf8(bytes: &[u8]) -> anyhow::Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(e) => anyhow::bail!(
            "invalid UTF-8 at byte {} (only UTF-8 and UTF-16 with a byte order mark are supported)",
            e.valid_up_to()
        ),
    }
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> anyhow::Result<String> {
    if bytes.len() % 2 != 0 {
        anyhow::bail!("truncated UTF-16 input: odd number of bytes");
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).context("invalid UTF-16 input")
}

/// Run the convert command
pub fn run(config: ConvertConfig) -> anyhow::Result<ConvertStats> {
    let script = read_script(&config.input)?;
    let batches = split_batches(&script);

    let progress_bar = if config.progress {
        let pb = ProgressBar::new(batches.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );
        pb.set_message("Converting...");
        Some(pb)
    } else {
        None
    };

    let mut writer: Box<dyn Write> = if config.dry_run {
        Box::new(std::io::sink())
    } else {
        match &config.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                Box::new(BufWriter::with_capacity(256 * 1024, file))
            }
            None => Box::new(BufWriter::new(std::io::stdout())),
        }
    };

    if config.header {
        write_header(&mut writer, &config)?;
    }

    let mut converter = Converter::new(config.pipeline.clone());
    let mut stats = ConvertStats::default();

    for batch in &batches {
        let converted = convert_one(&mut converter, batch.text, &mut stats);
        writeln!(writer, "{}", terminate(&converted))?;
        writeln!(writer)?;

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }
    writer.flush()?;

    converter.finish(&mut stats);

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!(
            "{} substitutions",
            stats.total_substitutions()
        ));
    }

    Ok(stats)
}

/// Write output header
fn write_header(writer: &mut dyn Write, config: &ConvertConfig) -> std::io::Result<()> {
    writeln!(writer, "-- Converted by mssql2pg")?;
    writeln!(writer, "-- Source: {}", config.input.display())?;
    writeln!(writer, "-- Rules: {}", config.pipeline.describe())?;
    writeln!(
        writer,
        "-- Date: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(writer)?;
    Ok(())
}
