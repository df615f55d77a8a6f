//! Command roots, namespace manifests and registry lookup.
//!
//! A CLI is made of one or more [`Root`]s. Each root holds a [`Namespace`]
//! tree whose children are commands or further namespaces, and namespaces
//! may declare a manifest of [`SubcommandDefinition`]s adding aliases,
//! briefs, hidden entries and explicit targets.
//!
//! The [`Registry`] validates everything up front and then answers lookups
//! without failing.
//!
//! # Quick start
//!
//! ```
//! use cmdtree_core::{CommandSchema, Output, command_fn};
//! use cmdtree_registry::{Lookup, Namespace, Registry, Root, SubcommandDefinition};
//!
//! let schema = CommandSchema::builder().brief("Build it").build().unwrap();
//! let build = command_fn(schema, |_| Ok(Output::from("built")));
//!
//! let registry = Registry::new(vec![Root::new(
//!     Namespace::new()
//!         .with_command("build", build)
//!         .with_subcommand(SubcommandDefinition::new("build").with_alias("b")),
//! )])
//! .unwrap();
//!
//! let name = registry.canonical([(0, &[][..])], "b");
//! assert_eq!(name, "build");
//! assert!(matches!(registry.lookup(0, &[], &name), Lookup::Leaf { .. }));
//! assert!(matches!(registry.lookup(0, &[], "deploy"), Lookup::NoMatch));
//! ```

mod cache;
mod config;
mod error;
mod manifest;
mod namespace;
mod registry;

pub use cache::{ManifestCache, NamespaceKey};
pub use config::{CliConfig, Priority};
pub use error::{RegistryError, Result};
pub use manifest::{ManifestIndex, SubcommandDefinition, load_manifest};
pub use namespace::{DEFAULT_ROOT_LABEL, Namespace, NamespaceEntry, Root};
pub use registry::{Lookup, Registry, SubcommandEntry};
