//! Roots and the namespace tree.
//!
//! A [`Root`] owns one namespace tree plus a table of explicit targets that
//! manifest records can point at. Children registered on a [`Namespace`] are
//! discovered implicitly by name; manifest records (inline or from a file)
//! add aliases, briefs, hidden flags and explicit targets on top.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cmdtree_core::Command;

use crate::manifest::SubcommandDefinition;

/// Default label of a root in subcommand listings.
pub const DEFAULT_ROOT_LABEL: &str = "Subcommands";

/// A child of a namespace.
#[derive(Clone)]
pub enum NamespaceEntry {
    Command(Arc<dyn Command>),
    Namespace(Namespace),
}

impl fmt::Debug for NamespaceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceEntry::Command(_) => f.write_str("Command(..)"),
            NamespaceEntry::Namespace(ns) => f.debug_tuple("Namespace").field(ns).finish(),
        }
    }
}

/// A node grouping further subcommands.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandSchema, Output, command_fn};
/// use cmdtree_registry::{Namespace, NamespaceEntry, SubcommandDefinition};
///
/// let schema = CommandSchema::builder().brief("Show a record").build().unwrap();
/// let view = command_fn(schema, |_| Ok(Output::None));
///
/// let ns = Namespace::new()
///     .with_brief("Record tools")
///     .with_command("view", view)
///     .with_subcommand(SubcommandDefinition::new("view").with_alias("v"));
///
/// assert!(matches!(ns.entry("view"), Some(NamespaceEntry::Command(_))));
/// assert_eq!(ns.inline_manifest().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Namespace {
    brief: Option<String>,
    description: Option<String>,
    default: Option<Arc<dyn Command>>,
    children: BTreeMap<String, NamespaceEntry>,
    manifest: Vec<SubcommandDefinition>,
    manifest_file: Option<PathBuf>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brief(mut self, brief: &str) -> Self {
        self.brief = Some(brief.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Command run when resolution stops at this namespace.
    pub fn with_default(mut self, command: Arc<dyn Command>) -> Self {
        self.default = Some(command);
        self
    }

    pub fn with_command(mut self, name: &str, command: Arc<dyn Command>) -> Self {
        self.children
            .insert(name.to_string(), NamespaceEntry::Command(command));
        self
    }

    pub fn with_namespace(mut self, name: &str, namespace: Namespace) -> Self {
        self.children
            .insert(name.to_string(), NamespaceEntry::Namespace(namespace));
        self
    }

    /// Adds an inline manifest record.
    pub fn with_subcommand(mut self, definition: SubcommandDefinition) -> Self {
        self.manifest.push(definition);
        self
    }

    /// Reads additional manifest records from a file when the registry is
    /// built.
    pub fn with_manifest_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_file = Some(path.into());
        self
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Brief, falling back to the description, then to the default
    /// command's summary.
    pub fn summary(&self) -> Option<&str> {
        self.brief()
            .or(self.description())
            .or_else(|| self.default.as_ref().and_then(|cmd| cmd.schema().summary()))
    }

    pub fn default_command(&self) -> Option<&Arc<dyn Command>> {
        self.default.as_ref()
    }

    pub fn children(&self) -> &BTreeMap<String, NamespaceEntry> {
        &self.children
    }

    pub fn entry(&self, name: &str) -> Option<&NamespaceEntry> {
        self.children.get(name)
    }

    pub fn inline_manifest(&self) -> &[SubcommandDefinition] {
        &self.manifest
    }

    pub fn manifest_file(&self) -> Option<&Path> {
        self.manifest_file.as_deref()
    }

    /// Walks down `path` through nested namespaces.
    pub fn at(&self, path: &[String]) -> Option<&Namespace> {
        path.iter().try_fold(self, |ns, name| match ns.entry(name)? {
            NamespaceEntry::Namespace(child) => Some(child),
            NamespaceEntry::Command(_) => None,
        })
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("brief", &self.brief)
            .field("has_default", &self.default.is_some())
            .field("children", &self.children)
            .field("manifest", &self.manifest)
            .field("manifest_file", &self.manifest_file)
            .finish()
    }
}

/// One independent subcommand tree.
#[derive(Clone)]
pub struct Root {
    label: String,
    namespace: Namespace,
    targets: HashMap<String, Arc<dyn Command>>,
}

impl Root {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            label: DEFAULT_ROOT_LABEL.to_string(),
            namespace,
            targets: HashMap::new(),
        }
    }

    /// Label shown above this root's entries in subcommand listings.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Registers a command that manifest records can name as `filename`.
    pub fn with_target(mut self, id: &str, command: Arc<dyn Command>) -> Self {
        self.targets.insert(id.to_string(), command);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn target(&self, id: &str) -> Option<&Arc<dyn Command>> {
        self.targets.get(id)
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets: Vec<&String> = self.targets.keys().collect();
        targets.sort();
        f.debug_struct("Root")
            .field("label", &self.label)
            .field("namespace", &self.namespace)
            .field("targets", &targets)
            .finish()
    }
}
