//! Input path expansion and multi-file bookkeeping for the CLI.
//!
//! A `convert` input is either one script or a glob such as `views/**/*.sql`.

use anyhow::Context;
use std::path::{Component, Path, PathBuf};

/// Scripts selected by a CLI input argument
#[derive(Debug)]
pub struct InputFiles {
    pub files: Vec<PathBuf>,
    pub from_glob: bool,
    /// Literal directory prefix of the pattern; outputs mirror paths below it
    pub base: PathBuf,
}

/// Check if a path string contains glob pattern characters.
pub fn is_glob_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('[')
}

/// Resolve a literal path or glob pattern into script files, sorted.
///
/// Fails when a literal path does not exist, the pattern is invalid, or the
/// pattern matches no regular files.
pub fn expand_inputs(pattern: &Path) -> anyhow::Result<InputFiles> {
    let pattern_str = pattern.to_string_lossy();

    if !is_glob_pattern(&pattern_str) {
        if !pattern.exists() {
            anyhow::bail!("file does not exist: {}", pattern.display());
        }
        return Ok(InputFiles {
            files: vec![pattern.to_path_buf()],
            from_glob: false,
            base: pattern.parent().map(Path::to_path_buf).unwrap_or_default(),
        });
    }

    let mut files = Vec::new();
    for entry in glob::glob(&pattern_str)
        .with_context(|| format!("invalid glob pattern '{}'", pattern_str))?
    {
        let path =
            entry.with_context(|| format!("error reading path for pattern '{}'", pattern_str))?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        anyhow::bail!("no files match pattern: {}", pattern_str);
    }

    files.sort();

    Ok(InputFiles {
        files,
        from_glob: true,
        base: literal_prefix(pattern),
    })
}

/// Leading path components of `pattern` that contain no glob characters.
///
/// `exports/dbo/**/*.sql` gives `exports/dbo`.
pub fn literal_prefix(pattern: &Path) -> PathBuf {
    pattern
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !is_glob_pattern(&part.to_string_lossy()),
            _ => true,
        })
        .collect()
}

/// Path of `file` relative to `base`, or just its file name when it is not below `base`
pub fn relative_to<'a>(file: &'a Path, base: &Path) -> &'a Path {
    match file.strip_prefix(base) {
        Ok(rel) if rel.file_name().is_some() => rel,
        _ => file.file_name().map(Path::new).unwrap_or(file),
    }
}

/// Outcome of converting several scripts
#[derive(Debug, Default)]
pub struct MultiFileResult {
    /// Files selected by the pattern, including ones skipped by `--fail-fast`
    pub total_files: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl MultiFileResult {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, path: PathBuf, error: String) {
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn print_summary(&self) {
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!("Conversion Summary:");
        eprintln!("  Total files: {}", self.total_files);
        eprintln!("  Succeeded: {}", self.succeeded);
        eprintln!("  Failed: {}", self.failed);

        if self.has_failures() {
            eprintln!();
            eprintln!("Failed files:");
            for (path, error) in &self.errors {
                eprintln!("  - {}: {}", path.display(), error);
            }
        }
    }
}
