//! `len(<arg>)` → `length(<arg>)`
//!
//! The argument may contain arbitrarily nested parentheses, so the end of the
//! call is found with a depth scanner rather than a pattern. Parentheses inside
//! single-quoted literals do not count, and neither do `len(` calls there.
//!
//! The scan is a single pass with an explicit stack of open parentheses, so
//! nesting depth is bounded by the input length and not by the call stack.

use super::{RewriteWarning, RuleReport};
use once_cell::sync::Lazy;
use regex::{Match, Regex};

/// What the depth scan found for one `len(` occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    /// Inside a quoted literal, not a call
    Quoted,
    /// Opened but never closed
    Unclosed,
    /// Closed by a matching `)`
    Closed,
}

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    let calls: Vec<Match<'_>> = RE_LEN_CALL.find_iter(input).collect();
    if calls.is_empty() {
        return input.to_string();
    }

    let states = scan_calls(input, &calls);

    // Anything still open at the end is nested in the outermost open call
    if let Some((call, _)) = calls
        .iter()
        .zip(&states)
        .find(|(_, state)| **state == CallState::Unclosed)
    {
        report.warnings.push(RewriteWarning::UnbalancedCall {
            function: "len".to_string(),
            offset: call.start(),
        });
    }

    // The closing `)` is kept as-is; only the `len(` head changes
    let mut out = String::with_capacity(input.len() + 3 * calls.len());
    let mut copied = 0;
    for (call, state) in calls.iter().zip(&states) {
        if *state == CallState::Closed {
            out.push_str(&input[copied..call.start()]);
            out.push_str("length(");
            copied = call.end();
            report.substitutions += 1;
        }
    }
    out.push_str(&input[copied..]);
    out
}

/// Classify every `len(` match in one pass over `input`.
fn scan_calls(input: &str, calls: &[Match<'_>]) -> Vec<CallState> {
    let mut states = vec![CallState::Quoted; calls.len()];
    // One entry per open `(`; `Some(i)` when it opens `calls[i]`
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut next_call = 0;
    let mut in_literal = false;

    // Delimiters are ASCII, so byte offsets are always char boundaries.
    for (i, b) in input.bytes().enumerate() {
        match b {
            b'\'' => in_literal = !in_literal,
            b'(' if !in_literal => {
                // Calls whose `(` was skipped lie inside a literal
                while next_call < calls.len() && calls[next_call].end() - 1 < i {
                    next_call += 1;
                }
                if next_call < calls.len() && calls[next_call].end() - 1 == i {
                    states[next_call] = CallState::Unclosed;
                    open.push(Some(next_call));
                    next_call += 1;
                } else {
                    open.push(None);
                }
            }
            b')' if !in_literal => {
                if let Some(Some(call)) = open.pop() {
                    states[call] = CallState::Closed;
                }
            }
            _ => {}
        }
    }

    states
}

static RE_LEN_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\blen\s*\(").unwrap());
