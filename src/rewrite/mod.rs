//! Rewrite rules for turning SQL Server view definitions into PostgreSQL.
//!
//! Each [`Rule`] is a pure text-to-text transform:
//! - `date-format`: `convert(varchar(n), d, 120)` → `TO_CHAR(d, 'YYYY-MM-DD')`
//! - `type-cast`: `convert(type(n), expr)` → `expr::type(n)`
//! - `isnumeric`: `isnumeric(x) = 1` → numeric regex match
//! - `top-percent`: strip `TOP 100 PERCENT`
//! - `len`: `len(x)` → `length(x)`
//! - `isnull`: `isnull(x, '') != ''` → `x IS NOT NULL`
//!
//! Rules never fail. Input they do not recognise, or cannot rewrite safely,
//! passes through byte-for-byte; the latter is reported as a [`RewriteWarning`].

mod cast;
mod date_format;
mod length;
mod null_check;
mod numeric;
mod pipeline;
mod top_percent;
mod types;
mod warnings;

pub use numeric::NUMERIC_PATTERN;
pub use pipeline::{Pipeline, PipelineOutput, RuleCount};
pub use types::{is_allowed_type, map_type};
pub use warnings::{RewriteWarning, WarningCollector};

use serde::{Deserialize, Serialize};

/// A single dialect rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "date-format")]
    DateFormat,
    #[serde(rename = "type-cast")]
    TypeCast,
    #[serde(rename = "isnumeric")]
    NumericTest,
    #[serde(rename = "top-percent")]
    TopPercent,
    #[serde(rename = "len")]
    LengthFunction,
    #[serde(rename = "isnull")]
    NullCheck,
}

impl Rule {
    /// All rules, in the order the default pipeline applies them
    pub const ALL: [Rule; 6] = [
        Rule::DateFormat,
        Rule::TypeCast,
        Rule::NumericTest,
        Rule::TopPercent,
        Rule::LengthFunction,
        Rule::NullCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::DateFormat => "date-format",
            Rule::TypeCast => "type-cast",
            Rule::NumericTest => "isnumeric",
            Rule::TopPercent => "top-percent",
            Rule::LengthFunction => "len",
            Rule::NullCheck => "isnull",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::DateFormat => "convert(varchar(n), expr, 120) -> TO_CHAR(expr, 'YYYY-MM-DD')",
            Rule::TypeCast => "convert(type(n), expr) -> expr::type(n)",
            Rule::NumericTest => "isnumeric(expr) = 1 -> expr ~ '<numeric pattern>'",
            Rule::TopPercent => "remove TOP 100 PERCENT",
            Rule::LengthFunction => "len(expr) -> length(expr)",
            Rule::NullCheck => "isnull(expr, '') != '' -> expr IS NOT NULL",
        }
    }

    /// Rewrite `input`, discarding substitution counts and warnings.
    pub fn apply(&self, input: &str) -> String {
        self.apply_with(input, &mut RuleReport::default())
    }

    /// Rewrite `input`, recording what happened in `report`.
    pub fn apply_with(&self, input: &str, report: &mut RuleReport) -> String {
        match self {
            Rule::DateFormat => date_format::rewrite(input, report),
            Rule::TypeCast => cast::rewrite(input, report),
            Rule::NumericTest => numeric::rewrite(input, report),
            Rule::TopPercent => top_percent::rewrite(input, report),
            Rule::LengthFunction => length::rewrite(input, report),
            Rule::NullCheck => null_check::rewrite(input, report),
        }
    }
}

impl std::str::FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date-format" | "date_format" | "style120" | "to_char" => Ok(Rule::DateFormat),
            "type-cast" | "type_cast" | "cast" | "convert" => Ok(Rule::TypeCast),
            "isnumeric" | "numeric-test" | "numeric_test" => Ok(Rule::NumericTest),
            "top-percent" | "top_percent" | "top" => Ok(Rule::TopPercent),
            "len" | "length" => Ok(Rule::LengthFunction),
            "isnull" | "null-check" | "null_check" => Ok(Rule::NullCheck),
            _ => Err(format!(
                "Unknown rule: {}. Valid options: date-format, type-cast, isnumeric, top-percent, len, isnull",
                s
            )),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a rule did during one call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub substitutions: usize,
    pub warnings: Vec<RewriteWarning>,
}

/// Apply a single rule to `input`.
pub fn rewrite(rule: Rule, input: &str) -> String {
    rule.apply(input)
}
