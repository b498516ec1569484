//! YAML configuration for the convert command.
//!
//! ```yaml
//! # Rule order; date-format must precede type-cast
//! rules: [date-format, type-cast, isnumeric, top-percent, len, isnull]
//! strict: false
//! header: true
//! ```

use crate::rewrite::{Pipeline, Rule};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete YAML configuration for the convert command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineYamlConfig {
    /// Rules to apply, in order
    pub rules: Vec<Rule>,
    /// Fail when any rewrite warning is raised
    pub strict: bool,
    /// Write the comment header at the top of each output file
    pub header: bool,
}

impl Default for PipelineYamlConfig {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
            strict: false,
            header: true,
        }
    }
}

impl PipelineYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: PipelineYamlConfig = serde_yaml_ng::from_str(content)?;
        // Surface ordering problems at load time rather than at first use
        config.pipeline()?;
        Ok(config)
    }

    /// Build the configured pipeline
    pub fn pipeline(&self) -> anyhow::Result<Pipeline> {
        Pipeline::new(self.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PipelineYamlConfig::default();
        assert_eq!(config.rules, Rule::ALL.to_vec());
        assert!(!config.strict);
        assert!(config.header);
        assert_eq!(config.pipeline().unwrap(), Pipeline::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = PipelineYamlConfig::parse("strict: true\n").unwrap();
        assert!(config.strict);
        assert!(config.header);
        assert_eq!(config.rules, Rule::ALL.to_vec());
    }

    #[test]
    fn test_parse_rule_list() {
        let yaml = r#"
rules:
  - date-format
  - type-cast
  - len
header: false
"#;
        let config = PipelineYamlConfig::parse(yaml).unwrap();
        assert_eq!(
            config.rules,
            vec![Rule::DateFormat, Rule::TypeCast, Rule::LengthFunction]
        );
        assert!(!config.header);
    }

    #[test]
    fn test_parse_rejects_bad_order() {
        let err = PipelineYamlConfig::parse("rules: [type-cast, date-format]\n").unwrap_err();
        assert!(err.to_string().contains("must come before"));
    }

    #[test]
    fn test_parse_rejects_unknown_rule() {
        assert!(PipelineYamlConfig::parse("rules: [coalesce]\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "rules: [isnull, len]").unwrap();

        let config = PipelineYamlConfig::load(file.path()).unwrap();
        assert_eq!(config.rules, vec![Rule::NullCheck, Rule::LengthFunction]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineYamlConfig::load(Path::new("/nonexistent/mssql2pg.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
