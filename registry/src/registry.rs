//! Registry lookup across roots.
//!
//! [`Registry::new`] walks every namespace of every root once, loading and
//! indexing manifests into the [`ManifestCache`]. All configuration errors
//! surface there. [`Registry::lookup`] never fails: a name that matches
//! nothing yields [`Lookup::NoMatch`].

use std::collections::HashMap;
use std::sync::Arc;

use cmdtree_core::{Command, NAME_RE};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{ManifestCache, NamespaceKey};
use crate::error::{RegistryError, Result};
use crate::manifest::{ManifestIndex, insert_alias, load_manifest};
use crate::namespace::{Namespace, NamespaceEntry, Root};

/// Result of looking up one token in one namespace.
#[derive(Clone)]
pub enum Lookup {
    /// An invocable command. `explicit` is set when a manifest record named
    /// the target.
    Leaf {
        name: String,
        command: Arc<dyn Command>,
        explicit: bool,
    },
    /// A nested namespace; resolution continues inside it.
    Namespace { name: String },
    NoMatch,
}

impl Lookup {
    /// Canonical name of the match.
    pub fn name(&self) -> Option<&str> {
        match self {
            Lookup::Leaf { name, .. } | Lookup::Namespace { name } => Some(name),
            Lookup::NoMatch => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Lookup::Leaf { .. })
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Lookup::NoMatch)
    }
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Leaf { name, explicit, .. } => f
                .debug_struct("Leaf")
                .field("name", name)
                .field("explicit", explicit)
                .finish_non_exhaustive(),
            Lookup::Namespace { name } => f.debug_struct("Namespace").field("name", name).finish(),
            Lookup::NoMatch => f.write_str("NoMatch"),
        }
    }
}

/// A subcommand as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcommandEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    #[serde(skip)]
    pub hidden: bool,
}

/// Immutable set of roots with memoized manifests.
#[derive(Debug)]
pub struct Registry {
    roots: Vec<Root>,
    cache: ManifestCache,
}

impl Registry {
    /// Builds the registry, eagerly validating every namespace.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] found: malformed manifest files,
    /// invalid or duplicate names, unknown explicit targets, or aliases
    /// pointing to different subcommands (within a namespace or across roots
    /// at the same path).
    pub fn new(roots: Vec<Root>) -> Result<Self> {
        let registry = Self {
            roots,
            cache: ManifestCache::new(),
        };

        let mut paths: Vec<Vec<String>> = Vec::new();
        for (index, root) in registry.roots.iter().enumerate() {
            registry.preload(index, root, root.namespace(), &mut Vec::new(), &mut paths)?;
        }
        registry.check_shared_aliases(&paths)?;

        debug!(
            roots = registry.roots.len(),
            namespaces = registry.cache.len(),
            "Registry built"
        );
        Ok(registry)
    }

    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    pub fn root(&self, index: usize) -> Option<&Root> {
        self.roots.get(index)
    }

    pub fn namespace(&self, root: usize, path: &[String]) -> Option<&Namespace> {
        self.root(root)?.namespace().at(path)
    }

    /// Declared subcommands of a namespace.
    ///
    /// Namespaces outside the tree have an empty manifest.
    pub fn manifest(&self, root: usize, path: &[String]) -> Arc<ManifestIndex> {
        let key = NamespaceKey::new(root, path);
        if let Some(index) = self.cache.get(&key) {
            return index;
        }

        let Some(namespace) = self.namespace(root, path) else {
            return Arc::new(ManifestIndex::default());
        };
        self.cache
            .get_or_try_insert_with(&key, || index_namespace(&key, namespace))
            .unwrap_or_else(|e| {
                warn!(path = %key.display_path(), error = %e, "Manifest failed to load");
                Arc::new(ManifestIndex::default())
            })
    }

    /// Rewrites an alias declared in any of `namespaces` to its canonical
    /// name.
    ///
    /// Namespaces at the same path in different roots share their aliases,
    /// so a token maps to the same name in every root. A name declared by
    /// any manifest takes precedence over an alias.
    pub fn canonical<'p, I>(&self, namespaces: I, token: &str) -> String
    where
        I: IntoIterator<Item = (usize, &'p [String])>,
    {
        let indexes: Vec<Arc<ManifestIndex>> = namespaces
            .into_iter()
            .map(|(root, path)| self.manifest(root, path))
            .collect();
        if indexes.iter().any(|index| index.get(token).is_some()) {
            return token.to_string();
        }
        indexes
            .iter()
            .find_map(|index| index.aliases().get(token).cloned())
            .unwrap_or_else(|| token.to_string())
    }

    /// Looks the canonical `name` up in the namespace at `path` of `root`.
    ///
    /// Aliases are not rewritten here; see [`Registry::canonical`]. A
    /// manifest record with an explicit target wins over an implicit child
    /// of the same name.
    pub fn lookup(&self, root: usize, path: &[String], name: &str) -> Lookup {
        let Some(namespace) = self.namespace(root, path) else {
            return Lookup::NoMatch;
        };
        let index = self.manifest(root, path);
        let name = name.to_string();

        let explicit = index
            .get(&name)
            .and_then(|def| def.filename.as_deref())
            .and_then(|target| self.roots[root].target(target));
        if let Some(command) = explicit {
            return Lookup::Leaf {
                name,
                command: Arc::clone(command),
                explicit: true,
            };
        }

        match namespace.entry(&name) {
            Some(NamespaceEntry::Command(command)) => Lookup::Leaf {
                name,
                command: Arc::clone(command),
                explicit: false,
            },
            Some(NamespaceEntry::Namespace(_)) => Lookup::Namespace { name },
            None => Lookup::NoMatch,
        }
    }

    /// Subcommands of one namespace for listings: manifest records in
    /// declaration order, then implicit children not covered by a record.
    ///
    /// Hidden entries are included and flagged.
    pub fn subcommands(&self, root: usize, path: &[String]) -> Vec<SubcommandEntry> {
        let Some(namespace) = self.namespace(root, path) else {
            return Vec::new();
        };
        let index = self.manifest(root, path);

        let mut entries: Vec<SubcommandEntry> = index
            .definitions()
            .iter()
            .map(|def| {
                let implicit_brief = def
                    .filename
                    .as_deref()
                    .and_then(|target| self.roots[root].target(target))
                    .and_then(|cmd| cmd.schema().summary().map(str::to_string))
                    .or_else(|| namespace.entry(&def.name).and_then(entry_brief));
                SubcommandEntry {
                    name: def.name.clone(),
                    aliases: def.all_aliases().into_iter().map(str::to_string).collect(),
                    brief: def.brief.clone().or(implicit_brief),
                    hidden: def.hidden,
                }
            })
            .collect();

        for (name, entry) in namespace.children() {
            if index.get(name).is_none() {
                entries.push(SubcommandEntry {
                    name: name.clone(),
                    aliases: Vec::new(),
                    brief: entry_brief(entry),
                    hidden: false,
                });
            }
        }

        entries
    }

    fn preload(
        &self,
        root_index: usize,
        root: &Root,
        namespace: &Namespace,
        path: &mut Vec<String>,
        paths: &mut Vec<Vec<String>>,
    ) -> Result<()> {
        let key = NamespaceKey::new(root_index, path);
        let index = self
            .cache
            .get_or_try_insert_with(&key, || index_namespace(&key, namespace))?;

        for def in index.definitions() {
            if let Some(target) = &def.filename {
                if root.target(target).is_none() {
                    return Err(RegistryError::UnknownTarget {
                        name: def.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        if !paths.contains(path) {
            paths.push(path.clone());
        }

        for (name, entry) in namespace.children() {
            if !NAME_RE.is_match(name) {
                return Err(RegistryError::InvalidName(name.clone()));
            }
            if let NamespaceEntry::Namespace(child) = entry {
                path.push(name.clone());
                self.preload(root_index, root, child, path, paths)?;
                path.pop();
            }
        }

        Ok(())
    }

    /// Namespaces at the same path in different roots are probed with the
    /// same token, so their aliases must agree.
    fn check_shared_aliases(&self, paths: &[Vec<String>]) -> Result<()> {
        for path in paths {
            let mut aliases: HashMap<String, String> = HashMap::new();
            for root in 0..self.roots.len() {
                let Some(index) = self.cache.get(&NamespaceKey::new(root, path)) else {
                    continue;
                };
                for def in index.definitions() {
                    for alias in def.all_aliases() {
                        insert_alias(&mut aliases, alias, &def.name)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn index_namespace(key: &NamespaceKey, namespace: &Namespace) -> Result<ManifestIndex> {
    let mut definitions = namespace.inline_manifest().to_vec();
    if let Some(file) = namespace.manifest_file() {
        let loaded = load_manifest(file)?;
        debug!(path = %key.display_path(), file = %file.display(), records = loaded.len(), "Loaded manifest file");
        definitions.extend(loaded);
    }
    ManifestIndex::build(&key.display_path(), definitions)
}

fn entry_brief(entry: &NamespaceEntry) -> Option<String> {
    match entry {
        NamespaceEntry::Command(cmd) => cmd.schema().summary().map(str::to_string),
        NamespaceEntry::Namespace(ns) => ns.summary().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use cmdtree_core::{CommandSchema, Output, command_fn};

    use crate::manifest::SubcommandDefinition;

    use super::*;

    fn noop(brief: &str) -> Arc<dyn Command> {
        let schema = CommandSchema::builder().brief(brief).build().unwrap();
        command_fn(schema, |_| Ok(Output::None))
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_lookup_leaf_namespace_and_no_match() {
        let registry = Registry::new(vec![Root::new(
            Namespace::new()
                .with_command("view", noop("View"))
                .with_namespace("bar", Namespace::new()),
        )])
        .unwrap();

        assert!(matches!(
            registry.lookup(0, &[], "view"),
            Lookup::Leaf { explicit: false, .. }
        ));
        assert_eq!(registry.lookup(0, &[], "bar").name(), Some("bar"));
        assert!(!registry.lookup(0, &[], "zzz").is_match());
        assert!(!registry.lookup(0, &path(&["nope"]), "view").is_match());
    }

    #[test]
    fn test_canonical_rewrites_aliases() {
        let registry = Registry::new(vec![Root::new(
            Namespace::new()
                .with_command("view", noop("View"))
                .with_subcommand(SubcommandDefinition::new("view").with_alias("v")),
        )])
        .unwrap();

        let name = registry.canonical([(0, &[][..])], "v");
        assert_eq!(name, "view");
        assert!(registry.lookup(0, &[], &name).is_leaf());
        assert!(!registry.lookup(0, &[], "v").is_match());
    }

    #[test]
    fn test_canonical_shares_aliases_across_roots() {
        let registry = Registry::new(vec![
            Root::new(
                Namespace::new()
                    .with_command("view", noop("Core view"))
                    .with_subcommand(SubcommandDefinition::new("view").with_alias("v")),
            ),
            Root::new(Namespace::new().with_command("view", noop("Extension view"))),
        ])
        .unwrap();

        assert_eq!(registry.canonical([(1, &[][..])], "v"), "v");
        assert_eq!(registry.canonical([(1, &[][..]), (0, &[][..])], "v"), "view");
    }

    #[test]
    fn test_canonical_prefers_declared_names() {
        let registry = Registry::new(vec![
            Root::new(Namespace::new().with_subcommand(SubcommandDefinition::new("build").with_alias("b"))),
            Root::new(Namespace::new().with_subcommand(SubcommandDefinition::new("b"))),
        ])
        .unwrap();

        assert_eq!(registry.canonical([(0, &[][..]), (1, &[][..])], "b"), "b");
    }

    #[test]
    fn test_explicit_target_beats_implicit_child() {
        let registry = Registry::new(vec![
            Root::new(
                Namespace::new()
                    .with_command("run", noop("Old run"))
                    .with_subcommand(SubcommandDefinition::new("run").with_target("run-v2")),
            )
            .with_target("run-v2", noop("New run")),
        ])
        .unwrap();

        match registry.lookup(0, &[], "run") {
            Lookup::Leaf {
                command, explicit, ..
            } => {
                assert!(explicit);
                assert_eq!(command.schema().brief(), Some("New run"));
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_target_is_config_error() {
        let err = Registry::new(vec![Root::new(
            Namespace::new().with_subcommand(SubcommandDefinition::new("run").with_target("missing")),
        )])
        .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTarget { .. }));
    }

    #[test]
    fn test_alias_conflict_across_roots_is_config_error() {
        let err = Registry::new(vec![
            Root::new(Namespace::new().with_subcommand(SubcommandDefinition::new("build").with_alias("b"))),
            Root::new(Namespace::new().with_subcommand(SubcommandDefinition::new("bundle").with_alias("b"))),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::AliasConflict { .. }));
    }

    #[test]
    fn test_invalid_child_name_is_config_error() {
        let err = Registry::new(vec![Root::new(
            Namespace::new().with_command("bad name", noop("x")),
        )])
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
    }

    #[test]
    fn test_subcommands_merge_manifest_and_children() {
        let registry = Registry::new(vec![Root::new(
            Namespace::new()
                .with_command("view", noop("View a record"))
                .with_namespace("tools", Namespace::new().with_brief("Tooling"))
                .with_subcommand(SubcommandDefinition::new("view").with_alias("v"))
                .with_subcommand(SubcommandDefinition::new("secret").hidden()),
        )])
        .unwrap();

        let entries = registry.subcommands(0, &[]);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["view", "secret", "tools"]);
        assert_eq!(entries[0].brief.as_deref(), Some("View a record"));
        assert_eq!(entries[0].aliases, vec!["v"]);
        assert!(entries[1].hidden);
        assert_eq!(entries[2].brief.as_deref(), Some("Tooling"));
    }
}
