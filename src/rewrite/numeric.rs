//! `isnumeric(<expr>) = 1` → regex match against a numeric literal pattern

use super::RuleReport;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// PostgreSQL pattern accepting signed integers, decimals and exponents
pub const NUMERIC_PATTERN: &str = r"'^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$'";

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    RE_ISNUMERIC
        .replace_all(input, |caps: &Captures<'_>| {
            report.substitutions += 1;
            format!("{} ~ {}", &caps[1], NUMERIC_PATTERN)
        })
        .into_owned()
}

static RE_ISNUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bisnumeric\s*\(([^)]+)\)\s*=\s*1\b").unwrap());
