//! Warnings raised while rewriting.
//!
//! Rules never fail: a fragment they cannot safely rewrite is left as-is.
//! Those fragments are reported here so the caller can decide whether to
//! accept the output (or reject it in strict mode).

use serde::Serialize;

/// Something a rule saw but deliberately did not rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewriteWarning {
    /// `convert(<type>, …)` with a type outside the allowed set
    UnsupportedCastType { type_name: String, fragment: String },
    /// Function call whose opening parenthesis is never closed
    UnbalancedCall { function: String, offset: usize },
}

impl std::fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteWarning::UnsupportedCastType {
                type_name,
                fragment,
            } => {
                write!(
                    f,
                    "Unsupported cast type: {} in `{}` (left unchanged)",
                    type_name, fragment
                )
            }
            RewriteWarning::UnbalancedCall { function, offset } => {
                write!(
                    f,
                    "Unbalanced call: {}( at byte {} has no closing parenthesis (left unchanged)",
                    function, offset
                )
            }
        }
    }
}

/// Collects warnings across batches
#[derive(Debug, Serialize)]
pub struct WarningCollector {
    warnings: Vec<RewriteWarning>,
    #[serde(skip)]
    max_warnings: usize,
    #[serde(rename = "warnings_truncated")]
    truncated: bool,
}

impl Default for WarningCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            warnings: Vec::new(),
            max_warnings: limit,
            truncated: false,
        }
    }

    /// Add a warning, skipping ones similar to a warning already collected
    pub fn add(&mut self, warning: RewriteWarning) {
        if self.warnings.iter().any(|w| Self::is_similar(w, &warning)) {
            return;
        }
        if self.warnings.len() < self.max_warnings {
            self.warnings.push(warning);
        } else {
            self.truncated = true;
        }
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = RewriteWarning>) {
        for warning in warnings {
            self.add(warning);
        }
    }

    /// One warning per unsupported type name is enough
    fn is_similar(a: &RewriteWarning, b: &RewriteWarning) -> bool {
        match (a, b) {
            (
                RewriteWarning::UnsupportedCastType { type_name: t1, .. },
                RewriteWarning::UnsupportedCastType { type_name: t2, .. },
            ) => t1.eq_ignore_ascii_case(t2),
            _ => a == b,
        }
    }

    pub fn warnings(&self) -> &[RewriteWarning] {
        &self.warnings
    }

    /// Whether warnings were dropped after reaching the limit
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Print summary of warnings to stderr
    pub fn print_summary(&self) {
        if self.warnings.is_empty() {
            return;
        }

        eprintln!("\nRewrite warnings ({}):", self.warnings.len());
        for warning in &self.warnings {
            eprintln!("  ⚠ {}", warning);
        }

        if self.truncated {
            eprintln!("  ... (additional warnings truncated)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(type_name: &str) -> RewriteWarning {
        RewriteWarning::UnsupportedCastType {
            type_name: type_name.to_string(),
            fragment: format!("convert({}, x)", type_name),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            cast("xml").to_string(),
            "Unsupported cast type: xml in `convert(xml, x)` (left unchanged)"
        );
        let unbalanced = RewriteWarning::UnbalancedCall {
            function: "len".to_string(),
            offset: 7,
        };
        assert!(unbalanced.to_string().contains("len( at byte 7"));
    }

    #[test]
    fn test_dedup_by_type_name() {
        let mut collector = WarningCollector::new();
        collector.add(cast("xml"));
        collector.add(cast("XML"));
        collector.add(cast("uniqueidentifier"));

        assert_eq!(collector.count(), 2);
    }

    #[test]
    fn test_unbalanced_calls_dedup_only_when_equal() {
        let mut collector = WarningCollector::new();
        for offset in [3, 3, 9] {
            collector.add(RewriteWarning::UnbalancedCall {
                function: "len".to_string(),
                offset,
            });
        }

        assert_eq!(collector.count(), 2);
    }

    #[test]
    fn test_limit() {
        let mut collector = WarningCollector::with_limit(2);
        collector.extend(["a", "b", "c"].into_iter().map(cast));

        assert_eq!(collector.count(), 2);
        assert!(collector.truncated());
        assert!(collector.has_warnings());
    }

    #[test]
    fn test_serialize_collector() {
        let mut collector = WarningCollector::with_limit(1);
        collector.extend(["xml", "geography"].into_iter().map(cast));

        let json = serde_json::to_value(&collector).unwrap();
        assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(json["warnings_truncated"], true);
        assert!(json.get("max_warnings").is_none());
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_string(&cast("xml")).unwrap();
        assert!(json.contains("\"kind\":\"unsupported_cast_type\""));
        assert!(json.contains("\"type_name\":\"xml\""));
    }
}
