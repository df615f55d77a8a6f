//! Errors surfaced by [`Cli::execute`](crate::Cli::execute).

use cmdtree_core::{CastError, CommandError};
use cmdtree_registry::RegistryError;
use thiserror::Error;

use crate::help::HelpInfo;

/// What went wrong with an invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsageErrorKind {
    #[error("Unknown subcommand \"{name}\"{}", did_you_mean(.suggestions))]
    UnknownSubcommand {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Unknown option flag \"{0}\"")]
    UnknownFlag(char),

    #[error("Unknown option `{0}`")]
    UnknownOption(String),

    #[error("Only the last flag in a sequence can refer to an option instead of a toggle")]
    ValueFlagNotLast,

    #[error("Expecting value for option `{0}`")]
    MissingOptionValue(String),

    #[error("Expecting a value instead of an option or toggle \"{token}\" for option `{option}`")]
    OptionAsValue { token: String, option: String },

    #[error("Expecting {expected} parameter(s) at most but got unexpected \"{token}\"")]
    TooManyArguments { expected: usize, token: String },

    #[error("Expecting parameter(s) {}", quote_list(.0))]
    MissingParams(Vec<String>),

    #[error("Missing required option(s) {}", quote_list(.0))]
    MissingOptions(Vec<String>),

    #[error("Expecting at least one element for variadic parameters `{0}`")]
    EmptyTail(String),

    #[error("{0}")]
    Cast(#[from] CastError),
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("`{n}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(", did you mean {}?", quote_list(suggestions))
    }
}

/// A usage error together with the help the shim prints after it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct UsageError {
    pub kind: UsageErrorKind,
    pub help: HelpInfo,
}

impl UsageError {
    pub fn new(kind: UsageErrorKind, help: HelpInfo) -> Self {
        Self { kind, help }
    }

    pub fn code(&self) -> i32 {
        match &self.kind {
            UsageErrorKind::Cast(err) => err.code,
            _ => 1,
        }
    }
}

/// Errors returned by the CLI entry points.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Registry configuration error, raised while building the CLI.
    #[error(transparent)]
    Config(#[from] RegistryError),

    /// Error returned by the command itself.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(err) => err.code(),
            CliError::Command(err) => err.code(),
            CliError::Config(_) => 1,
        }
    }

    pub fn help(&self) -> Option<&HelpInfo> {
        match self {
            CliError::Usage(err) => Some(&err.help),
            _ => None,
        }
    }
}
