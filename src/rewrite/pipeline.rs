//! Ordered composition of rewrite rules.

use super::{RewriteWarning, Rule, RuleReport};
use serde::Serialize;

/// An ordered, duplicate-free list of rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    rules: Vec<Rule>,
}

/// Substitutions made by one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule: Rule,
    pub substitutions: usize,
}

/// Result of running a pipeline over one piece of text
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub text: String,
    /// One entry per rule, in pipeline order
    pub counts: Vec<RuleCount>,
    pub warnings: Vec<RewriteWarning>,
}

impl PipelineOutput {
    pub fn total_substitutions(&self) -> usize {
        self.counts.iter().map(|c| c.substitutions).sum()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
        }
    }
}

impl Pipeline {
    /// Build a pipeline from an explicit rule order.
    ///
    /// The style-120 date rule has to see `convert(varchar, d, 120)` before the
    /// generic cast rule does, so `type-cast` ahead of `date-format` is rejected.
    pub fn new(rules: Vec<Rule>) -> anyhow::Result<Self> {
        if rules.is_empty() {
            anyhow::bail!("pipeline needs at least one rule");
        }

        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].contains(rule) {
                anyhow::bail!("rule '{}' listed more than once", rule);
            }
        }

        let position = |r: Rule| rules.iter().position(|x| *x == r);
        if let (Some(cast), Some(date)) = (position(Rule::TypeCast), position(Rule::DateFormat)) {
            if cast < date {
                anyhow::bail!(
                    "rule '{}' must come before '{}'",
                    Rule::DateFormat,
                    Rule::TypeCast
                );
            }
        }

        Ok(Self { rules })
    }

    /// Parse a comma-separated rule list, e.g. `"date-format,type-cast,len"`.
    pub fn from_names(list: &str) -> anyhow::Result<Self> {
        let rules = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Rule>().map_err(|e| anyhow::anyhow!(e)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Comma-separated rule names in order
    pub fn describe(&self) -> String {
        self.rules
            .iter()
            .map(Rule::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Apply every rule in order.
    pub fn rewrite(&self, input: &str) -> String {
        self.run(input).text
    }

    /// Apply every rule in order, keeping per-rule counts and warnings.
    pub fn run(&self, input: &str) -> PipelineOutput {
        let mut output = PipelineOutput {
            text: input.to_string(),
            counts: Vec::with_capacity(self.rules.len()),
            warnings: Vec::new(),
        };

        for rule in &self.rules {
            let mut report = RuleReport::default();
            output.text = rule.apply_with(&output.text, &mut report);
            output.counts.push(RuleCount {
                rule: *rule,
                substitutions: report.substitutions,
            });
            output.warnings.extend(report.warnings);
        }

        output
    }
}
