//! Splitting T-SQL scripts into `GO`-delimited batches.
//!
//! `GO` is a client-side separator understood by SQL Server tools, not SQL.
//! Scripted views usually come out as one `CREATE VIEW` per batch:
//!
//! ```sql
//! CREATE VIEW dbo.v_orders AS SELECT TOP 100 PERCENT * FROM orders
//! GO
//! CREATE VIEW dbo.v_names AS SELECT LEN(name) AS l FROM people
//! GO
//! ```
//!
//! A separator is a line containing only `GO`, optionally followed by a repeat
//! count or `;`. Separator lines are dropped; blank batches are skipped.

use once_cell::sync::Lazy;
use regex::Regex;

/// One batch of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Batch text, without the separator line
    pub text: &'a str,
    /// 1-based line number the batch starts on
    pub line: usize,
}

/// Split a script on `GO` separator lines.
pub fn split_batches(script: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut offset = 0;

    for (idx, line) in script.split_inclusive('\n').enumerate() {
        let end = offset + line.len();
        if is_separator(line) {
            push_batch(&mut batches, &script[start..offset], start_line);
            start = end;
            start_line = idx + 2;
        }
        offset = end;
    }

    push_batch(&mut batches, &script[start..], start_line);
    batches
}

/// Check if a single line is a `GO` separator
pub fn is_separator(line: &str) -> bool {
    RE_GO_LINE.is_match(line)
}

/// Batch text as a standalone statement: trimmed and `;`-terminated.
///
/// When the last line ends in a `--` comment the `;` goes on a line of its own,
/// otherwise it would be commented out.
pub fn terminate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match trailing_comment_start(trimmed) {
        Some(start) if trimmed[..start].trim_end().ends_with(';') => trimmed.to_string(),
        Some(_) => format!("{}\n;", trimmed),
        None if trimmed.ends_with(';') => trimmed.to_string(),
        None => format!("{};", trimmed),
    }
}

/// Byte offset of a `--` comment on the last line, outside quoted literals
fn trailing_comment_start(text: &str) -> Option<usize> {
    let line_start = text.rfind('\n').map_or(0, |i| i + 1);
    let line = &text.as_bytes()[line_start..];
    let mut in_literal = false;

    for (i, &b) in line.iter().enumerate() {
        match b {
            b'\'' => in_literal = !in_literal,
            b'-' if !in_literal && line.get(i + 1) == Some(&b'-') => return Some(line_start + i),
            _ => {}
        }
    }

    None
}

fn push_batch<'a>(batches: &mut Vec<Batch<'a>>, text: &'a str, line: usize) {
    if !text.trim().is_empty() {
        batches.push(Batch { text, line });
    }
}

static RE_GO_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*go(?:\s+\d+)?\s*;?\s*$").unwrap());
