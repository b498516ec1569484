//! `isnull(<expr>, '') != ''` → `<expr> IS NOT NULL`

use super::RuleReport;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    RE_ISNULL_NOT_EMPTY
        .replace_all(input, |caps: &Captures<'_>| {
            report.substitutions += 1;
            format!("{} IS NOT NULL", &caps[1])
        })
        .into_owned()
}

// The expression may not contain a comma; lazy so trailing blanks stay outside it
static RE_ISNULL_NOT_EMPTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bisnull\s*\(\s*([^,]+?)\s*,\s*''\s*\)\s*!=\s*''").unwrap()
});
