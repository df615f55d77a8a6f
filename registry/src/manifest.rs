//! Subcommand manifests.
//!
//! A namespace may declare its subcommands explicitly, either inline or in a
//! `.json`/`.yaml`/`.yml` file. Both forms use the same record shape:
//!
//! ```yaml
//! subcommands:
//!   - name: build
//!     alias: b
//!     brief: Build the project
//!   - name: publish
//!     aliases: [pub, release]
//!     filename: publish-v2
//!   - name: debug-dump
//!     hidden: true
//! ```
//!
//! A bare list of records is accepted as well.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use cmdtree_core::NAME_RE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegistryError, Result};

/// One declared subcommand.
///
/// # Examples
///
/// ```
/// use cmdtree_registry::SubcommandDefinition;
///
/// let def = SubcommandDefinition::new("build")
///     .with_alias("b")
///     .with_brief("Build the project");
/// assert_eq!(def.all_aliases(), vec!["b"]);
/// assert!(!def.hidden);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubcommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    /// Explicit target id, looked up in the root's target table instead of
    /// the namespace's children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Resolvable, but never listed or suggested.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl SubcommandDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_brief(mut self, brief: &str) -> Self {
        self.brief = Some(brief.to_string());
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.filename = Some(target.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// `alias` followed by `aliases`, without duplicates.
    pub fn all_aliases(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for alias in self.alias.iter().chain(self.aliases.iter()) {
            if !out.contains(&alias.as_str()) {
                out.push(alias);
            }
        }
        out
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    List(Vec<SubcommandDefinition>),
    Wrapped { subcommands: Vec<SubcommandDefinition> },
}

/// Loads manifest records from a file.
///
/// A missing or unreadable file yields no records; a file that exists but
/// does not parse is an error.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidManifest`] for unparsable content or an
/// unsupported extension.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<SubcommandDefinition>> {
    let path = path.as_ref();
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Manifest not readable, treating as empty");
            return Ok(Vec::new());
        }
    };
    let reader = BufReader::new(file);

    let invalid = |reason: String| RegistryError::InvalidManifest {
        path: path.to_path_buf(),
        reason,
    };

    let parsed: ManifestFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_reader(reader).map_err(|e| invalid(e.to_string()))?,
        Some("yaml" | "yml") => {
            serde_yaml::from_reader(reader).map_err(|e| invalid(e.to_string()))?
        }
        _ => return Err(invalid("expecting a .json, .yaml or .yml file".to_string())),
    };

    Ok(match parsed {
        ManifestFile::List(defs) | ManifestFile::Wrapped { subcommands: defs } => defs,
    })
}

/// Indexed manifest of one namespace.
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    definitions: Vec<SubcommandDefinition>,
    by_name: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl ManifestIndex {
    /// Indexes `definitions`, checking names and aliases.
    ///
    /// `namespace` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns the first invalid name, duplicate record or alias conflict.
    pub fn build(namespace: &str, definitions: Vec<SubcommandDefinition>) -> Result<Self> {
        let mut by_name = HashMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();

        for (i, def) in definitions.iter().enumerate() {
            if !NAME_RE.is_match(&def.name) {
                return Err(RegistryError::InvalidName(def.name.clone()));
            }
            if by_name.insert(def.name.clone(), i).is_some() {
                return Err(RegistryError::DuplicateSubcommand {
                    namespace: namespace.to_string(),
                    name: def.name.clone(),
                });
            }

            for alias in def.all_aliases() {
                if !NAME_RE.is_match(alias) {
                    return Err(RegistryError::InvalidName(alias.to_string()));
                }
                insert_alias(&mut aliases, alias, &def.name)?;
            }
        }

        Ok(Self {
            definitions,
            by_name,
            aliases,
        })
    }

    /// Rewrites an alias to its canonical name. Declared names take
    /// precedence over aliases.
    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        if self.by_name.contains_key(token) {
            return token;
        }
        self.aliases.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn get(&self, name: &str) -> Option<&SubcommandDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    pub fn definitions(&self) -> &[SubcommandDefinition] {
        &self.definitions
    }

    /// Alias to canonical name map.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Records `alias -> name`, failing if the alias already points elsewhere.
pub(crate) fn insert_alias(
    aliases: &mut HashMap<String, String>,
    alias: &str,
    name: &str,
) -> Result<()> {
    let existing = aliases
        .entry(alias.to_string())
        .or_insert_with(|| name.to_string());
    if existing != name {
        return Err(RegistryError::AliasConflict {
            alias: alias.to_string(),
            existing: existing.clone(),
            requested: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_prefers_names_over_aliases() {
        let index = ManifestIndex::build(
            "app",
            vec![
                SubcommandDefinition::new("build").with_alias("b"),
                SubcommandDefinition::new("b2").with_alias("build-two"),
            ],
        )
        .unwrap();
        assert_eq!(index.canonical("b"), "build");
        assert_eq!(index.canonical("build"), "build");
        assert_eq!(index.canonical("build-two"), "b2");
        assert_eq!(index.canonical("other"), "other");
    }

    #[test]
    fn test_alias_conflict_is_rejected() {
        let err = ManifestIndex::build(
            "app",
            vec![
                SubcommandDefinition::new("build").with_alias("x"),
                SubcommandDefinition::new("test").with_alias("x"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::AliasConflict { .. }));
        assert_eq!(
            err.to_string(),
            "alias \"x\" already exists and points to \"build\" instead of \"test\""
        );
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let err = ManifestIndex::build(
            "app",
            vec![SubcommandDefinition::new("a"), SubcommandDefinition::new("a")],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSubcommand { .. }));

        let err = ManifestIndex::build("app", vec![SubcommandDefinition::new("-bad")]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
    }

    #[test]
    fn test_load_manifest_formats() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("m.yaml");
        std::fs::write(&yaml, "subcommands:\n  - name: build\n    alias: b\n  - name: secret\n    hidden: true\n").unwrap();
        let defs = load_manifest(&yaml).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].alias.as_deref(), Some("b"));
        assert!(defs[1].hidden);

        let json = dir.path().join("m.json");
        std::fs::write(&json, r#"[{"name": "run", "aliases": ["r"], "filename": "run-v2"}]"#).unwrap();
        let defs = load_manifest(&json).unwrap();
        assert_eq!(defs[0].filename.as_deref(), Some("run-v2"));
        assert_eq!(defs[0].all_aliases(), vec!["r"]);
    }

    #[test]
    fn test_load_manifest_missing_is_empty_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_manifest(dir.path().join("none.json")).unwrap().is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            load_manifest(&bad),
            Err(RegistryError::InvalidManifest { .. })
        ));
    }
}
