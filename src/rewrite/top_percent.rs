//! Strip `TOP 100 PERCENT`, which PostgreSQL has no equivalent for

use super::RuleReport;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    RE_TOP_PERCENT
        .replace_all(input, |_: &Captures<'_>| {
            report.substitutions += 1;
            ""
        })
        .into_owned()
}

static RE_TOP_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btop\s*100\s*percent\b").unwrap());
