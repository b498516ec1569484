//! Convert command CLI handler.

use crate::convert::{self, Compression, ConvertConfig, ConvertStats, PipelineYamlConfig};
use crate::rewrite::Pipeline;
use ahash::AHashSet;
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::glob_util::{expand_inputs, relative_to, MultiFileResult};

/// Arguments of the `convert` subcommand
pub struct ConvertArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub rules: Option<String>,
    pub config: Option<PathBuf>,
    pub strict: bool,
    pub progress: bool,
    pub dry_run: bool,
    pub json: bool,
    pub no_header: bool,
    pub fail_fast: bool,
}

/// Effective settings after merging the YAML config with CLI flags
struct Settings {
    pipeline: Pipeline,
    strict: bool,
    header: bool,
}

/// JSON report for one converted file
#[derive(Serialize)]
struct ConvertJsonOutput {
    input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compression: Option<String>,
    dry_run: bool,
    rules: Vec<&'static str>,
    statistics: ConvertStats,
}

/// JSON report for a glob run
#[derive(Serialize)]
struct MultiConvertJsonOutput {
    total_files: usize,
    succeeded: usize,
    failed: usize,
    files: Vec<ConvertJsonOutput>,
    errors: Vec<FileError>,
}

#[derive(Serialize)]
struct FileError {
    file: String,
    error: String,
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args)?;
    let inputs = expand_inputs(&args.file)?;

    if !inputs.from_glob {
        let file = inputs.files.into_iter().next().ok_or_else(|| {
            anyhow::anyhow!("no input file: {}", args.file.display())
        })?;
        return run_single(file, &args, &settings);
    }

    let output_dir = match (&args.output, args.dry_run) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => None,
        (None, false) => {
            anyhow::bail!("Output directory required when using glob patterns. Use --output <dir>");
        }
    };

    run_multi(inputs.files, &inputs.base, output_dir, &args, &settings)
}

fn resolve_settings(args: &ConvertArgs) -> anyhow::Result<Settings> {
    let yaml = match &args.config {
        Some(path) => PipelineYamlConfig::load(path)?,
        None => PipelineYamlConfig::default(),
    };

    let pipeline = match &args.rules {
        Some(list) => Pipeline::from_names(list)?,
        None => yaml.pipeline()?,
    };

    Ok(Settings {
        pipeline,
        strict: args.strict || yaml.strict,
        header: yaml.header && !args.no_header,
    })
}

fn run_single(file: PathBuf, args: &ConvertArgs, settings: &Settings) -> anyhow::Result<()> {
    if args.json && args.output.is_none() && !args.dry_run {
        anyhow::bail!("--json requires --output: stdout is reserved for the JSON report");
    }

    let config = ConvertConfig {
        input: file.clone(),
        output: args.output.clone(),
        pipeline: settings.pipeline.clone(),
        dry_run: args.dry_run,
        progress: args.progress && !args.json,
        header: settings.header,
    };

    let stats = convert::run(config)?;
    let warning_count = stats.warnings.count();

    if args.json {
        let report = json_report(&file, args.output.as_deref(), args.dry_run, settings, stats);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stats(&stats, args.dry_run, args.progress);
    }

    if settings.strict && warning_count > 0 {
        anyhow::bail!("Strict mode: {} warnings generated", warning_count);
    }

    Ok(())
}

fn run_multi(
    files: Vec<PathBuf>,
    base: &Path,
    output_dir: Option<PathBuf>,
    args: &ConvertArgs,
    settings: &Settings,
) -> anyhow::Result<()> {
    let mut result = MultiFileResult::new(files.len());
    let total = result.total_files;
    let mut reports = Vec::new();
    let mut claimed_outputs = AHashSet::new();

    if let (Some(dir), false) = (&output_dir, args.dry_run) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    if !args.json {
        eprintln!(
            "Converting {} files [rules: {}]...\n",
            total,
            settings.pipeline.describe()
        );
    }

    for (idx, file) in files.iter().enumerate() {
        if !args.json {
            eprintln!("[{}/{}] Converting: {}", idx + 1, total, file.display());
        }

        let output_file = output_dir
            .as_ref()
            .map(|dir| output_path(dir, base, file, idx));

        if let Some(out) = &output_file {
            if !claimed_outputs.insert(out.clone()) {
                let message = format!(
                    "output {} would overwrite another converted file",
                    out.display()
                );
                if !args.json {
                    eprintln!("  Error: {}\n", message);
                }
                result.record_failure(file.clone(), message);
                if args.fail_fast {
                    break;
                }
                continue;
            }
        }

        let config = ConvertConfig {
            input: file.clone(),
            output: output_file.clone(),
            pipeline: settings.pipeline.clone(),
            dry_run: args.dry_run,
            progress: false,
            header: settings.header,
        };

        match convert::run(config) {
            Ok(stats) => {
                let warning_count = stats.warnings.count();
                if !args.json {
                    let warning_str = if warning_count == 0 {
                        String::new()
                    } else {
                        format!(" ({} warnings)", warning_count)
                    };
                    eprintln!(
                        "  {} batches: {} converted, {} unchanged, {} substitutions{}",
                        stats.batches_processed,
                        stats.batches_converted,
                        stats.batches_unchanged,
                        stats.total_substitutions(),
                        warning_str
                    );
                    for warning in stats.warnings.warnings() {
                        eprintln!("  ⚠ {}", warning);
                    }
                    if stats.warnings.truncated() {
                        eprintln!("  ... (additional warnings truncated)");
                    }
                    if let (Some(out), false) = (&output_file, args.dry_run) {
                        eprintln!("  → {}", out.display());
                    }
                    eprintln!();
                }

                reports.push(json_report(
                    file,
                    output_file.as_deref(),
                    args.dry_run,
                    settings,
                    stats,
                ));

                if settings.strict && warning_count > 0 {
                    result.record_failure(
                        file.clone(),
                        format!("{} warnings in strict mode", warning_count),
                    );
                    if args.fail_fast {
                        break;
                    }
                } else {
                    result.record_success();
                }
            }
            Err(e) => {
                if !args.json {
                    eprintln!("  Error: {}\n", e);
                }
                result.record_failure(file.clone(), e.to_string());
                if args.fail_fast {
                    break;
                }
            }
        }
    }

    if args.json {
        let output = MultiConvertJsonOutput {
            total_files: total,
            succeeded: result.succeeded,
            failed: result.failed,
            files: reports,
            errors: result
                .errors
                .iter()
                .map(|(path, error)| FileError {
                    file: path.display().to_string(),
                    error: error.clone(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        result.print_summary();
    }

    if result.has_failures() {
        anyhow::bail!("{} of {} files failed to convert", result.failed, total);
    }

    Ok(())
}

/// Output path for `file` below `dir`, mirroring its path under the pattern's base.
///
/// The compression extension is dropped: `base/dbo/v.sql.gz` becomes `dir/dbo/v.sql`.
fn output_path(dir: &Path, base: &Path, file: &Path, idx: usize) -> PathBuf {
    let relative = relative_to(file, base);
    let name =
        Compression::output_file_name(relative).unwrap_or_else(|| format!("output_{}.sql", idx));
    match relative.parent() {
        Some(parent) => dir.join(parent).join(name),
        None => dir.join(name),
    }
}

fn json_report(
    file: &Path,
    output: Option<&Path>,
    dry_run: bool,
    settings: &Settings,
    stats: ConvertStats,
) -> ConvertJsonOutput {
    let compression = Compression::from_path(file);
    ConvertJsonOutput {
        input_file: file.display().to_string(),
        output_file: if dry_run {
            None
        } else {
            output.map(|p| p.display().to_string())
        },
        compression: (compression != Compression::None).then(|| compression.to_string()),
        dry_run,
        rules: settings.pipeline.rules().iter().map(|r| r.name()).collect(),
        statistics: stats,
    }
}

fn print_stats(stats: &ConvertStats, dry_run: bool, progress: bool) {
    if progress || dry_run {
        eprintln!();
        eprintln!("Conversion Statistics:");
        eprintln!("  Batches processed: {}", stats.batches_processed);
        eprintln!("  Batches converted: {}", stats.batches_converted);
        eprintln!("  Batches unchanged: {}", stats.batches_unchanged);
        eprintln!("  Substitutions:");
        for count in &stats.substitutions {
            eprintln!("    {:<14} {}", count.rule.name(), count.substitutions);
        }
    }

    stats.warnings.print_summary();

    if dry_run {
        eprintln!();
        eprintln!("(Dry run - no output written)");
    }
}
