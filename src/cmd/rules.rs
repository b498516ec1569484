//! Rules command CLI handler.

use crate::rewrite::Rule;
use serde::Serialize;

#[derive(Serialize)]
struct RuleJson {
    order: usize,
    name: &'static str,
    description: &'static str,
}

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let rules: Vec<RuleJson> = Rule::ALL
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleJson {
                order: i + 1,
                name: rule.name(),
                description: rule.description(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{:<4} {:<14} Rewrite", "#", "Rule");
    println!("{}", "─".repeat(80));
    for (i, rule) in Rule::ALL.iter().enumerate() {
        println!("{:<4} {:<14} {}", i + 1, rule.name(), rule.description());
    }

    Ok(())
}
