//! CLI behaviour configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! priority: last-declared
//! parallel_probes: true
//! suggest_subcommands: true
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which root wins when several offer the same subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Later roots override earlier ones.
    #[default]
    LastDeclared,
    /// The first declared root wins.
    FirstDeclared,
}

impl Priority {
    /// Root indices from highest to lowest priority.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_registry::Priority;
    ///
    /// assert_eq!(Priority::LastDeclared.order(3), vec![2, 1, 0]);
    /// assert_eq!(Priority::FirstDeclared.order(3), vec![0, 1, 2]);
    /// ```
    pub fn order(self, roots: usize) -> Vec<usize> {
        match self {
            Priority::LastDeclared => (0..roots).rev().collect(),
            Priority::FirstDeclared => (0..roots).collect(),
        }
    }
}

/// Settings controlling resolution.
///
/// Every field has a default, so an empty document is a valid config.
///
/// # Examples
///
/// ```
/// use cmdtree_registry::{CliConfig, Priority};
///
/// let config = CliConfig::from_yaml_str("priority: first-declared").unwrap();
/// assert_eq!(config.priority, Priority::FirstDeclared);
/// assert!(config.parallel_probes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub priority: Priority,
    /// Probe live roots concurrently for each token.
    pub parallel_probes: bool,
    /// Add "did you mean" hints to unknown subcommand errors.
    pub suggest_subcommands: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            parallel_probes: true,
            suggest_subcommands: true,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
priority: first-declared
parallel_probes: false
suggest_subcommands: false
"#;
        let config = CliConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.priority, Priority::FirstDeclared);
        assert!(!config.parallel_probes);
        assert!(!config.suggest_subcommands);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CliConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.priority, Priority::LastDeclared);
    }

    #[test]
    fn test_unknown_priority_is_rejected() {
        assert!(CliConfig::from_yaml_str("priority: random").is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.yml");

        let original = CliConfig {
            priority: Priority::FirstDeclared,
            parallel_probes: false,
            suggest_subcommands: true,
        };
        original.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
