//! `convert(<type>[(<len>)], <expr>)` → `<expr>::<type>[(<len>)]`

use super::types::{is_allowed_type, map_type};
use super::{RewriteWarning, RuleReport};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    RE_CONVERT_CAST
        .replace_all(input, |caps: &Captures<'_>| {
            let fragment = &caps[0];
            let type_name = &caps[1];

            if !is_allowed_type(type_name) {
                report.warnings.push(RewriteWarning::UnsupportedCastType {
                    type_name: type_name.to_string(),
                    fragment: fragment.to_string(),
                });
                return fragment.to_string();
            }

            let length = caps.get(2).map_or("", |m| m.as_str());
            let expr = caps[3].trim();
            report.substitutions += 1;

            if expr == "''" {
                return format!("''::{}{}", map_type(type_name), length);
            }
            format!("{}::{}{}", expr, map_type(type_name), length)
        })
        .into_owned()
}

// Expression: word/dot/quote run, quoted literal, or one parenthesized group
static RE_CONVERT_CAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bconvert\s*\(\s*(\w+)(\(\s*[\d,\s.]+\s*\))?\s*,\s*([\w.']+|'[^']*'|\([^)]+\))\s*\)",
    )
    .unwrap()
});
