//! `convert(varchar[(n)], <expr>, 120)` → `TO_CHAR(<expr>, 'YYYY-MM-DD')`
//!
//! Must run before the generic cast rule. The declared length is dropped since
//! style 120 output has a fixed shape.

use super::RuleReport;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(super) fn rewrite(input: &str, report: &mut RuleReport) -> String {
    RE_CONVERT_STYLE_120
        .replace_all(input, |caps: &Captures<'_>| {
            report.substitutions += 1;
            format!("TO_CHAR({}, 'YYYY-MM-DD')", &caps[1])
        })
        .into_owned()
}

static RE_CONVERT_STYLE_120: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bconvert\s*\(\s*n?varchar\s*(?:\(\s*\d+\s*\))?\s*,\s*([^,]+?)\s*,\s*120\s*\)")
        .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn date_format(input: &str) -> String {
        rewrite(input, &mut RuleReport::default())
    }

    #[test]
    fn test_with_length() {
        assert_eq!(
            date_format("convert(varchar(10), somedate, 120)"),
            "TO_CHAR(somedate, 'YYYY-MM-DD')"
        );
    }

    #[test]
    fn test_without_length_and_case() {
        assert_eq!(
            date_format("CONVERT(VARCHAR, o.created_at,120) as d"),
            "TO_CHAR(o.created_at, 'YYYY-MM-DD') as d"
        );
        assert_eq!(
            date_format("convert ( nvarchar ( 20 ) , getdate() , 120 )"),
            "TO_CHAR(getdate(), 'YYYY-MM-DD')"
        );
    }

    #[test]
    fn test_other_styles_untouched() {
        for input in [
            "convert(varchar(10), d, 23)",
            "convert(varchar(10), d, 1201)",
            "convert(varchar(10), d)",
            "convert(char(10), d, 120)",
        ] {
            assert_eq!(date_format(input), input);
        }
    }

    #[test]
    fn test_counts() {
        let mut report = RuleReport::default();
        rewrite(
            "convert(varchar(10), a, 120) || convert(varchar(10), b, 120)",
            &mut report,
        );
        assert_eq!(report.substitutions, 2);
    }
}
