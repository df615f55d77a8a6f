//! Error types for registry construction.
//!
//! Every variant is a configuration error: it is raised while the registry
//! is being built, never while resolving an invocation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a registry or loading its files.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// An alias declared twice, pointing to different subcommands.
    #[error("alias \"{alias}\" already exists and points to \"{existing}\" instead of \"{requested}\"")]
    AliasConflict {
        alias: String,
        existing: String,
        requested: String,
    },

    /// Two manifest records with the same name in one namespace.
    #[error("duplicate subcommand \"{name}\" in namespace `{namespace}`")]
    DuplicateSubcommand { namespace: String, name: String },

    /// A subcommand name or alias that is not a valid command name.
    #[error("invalid subcommand name \"{0}\"")]
    InvalidName(String),

    /// A manifest record pointing to a target id the root does not define.
    #[error("subcommand \"{name}\" points to unknown target \"{target}\"")]
    UnknownTarget { name: String, target: String },

    /// A manifest file that could not be parsed.
    #[error("invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
