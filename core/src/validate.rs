//! Schema validation.
//!
//! Catches malformed declarations when a schema is built: required
//! parameters after optional ones, a misplaced variadic tail, invalid or
//! duplicate option names and flags. These are configuration errors and are
//! never deferred to invocation time.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let err = CommandSchema::builder()
//!     .option(OptionDefinition::toggle("verbose").with_flag("vv"))
//!     .build()
//!     .unwrap_err();
//! assert!(matches!(err, ConfigError::InvalidFlag { .. }));
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::CommandSchema;

/// Word characters with internal hyphens, e.g. `dry-run` or `pia-pia`.
pub static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(?:-\w+)*$").expect("static regex must compile"));

/// Schema configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A gap in explicitly positioned parameters.
    #[error("expecting parameter definition at position {0}")]
    MissingParamPosition(usize),
    /// A required parameter declared after an optional one.
    #[error("required parameter `{0}` cannot follow optional ones")]
    RequiredAfterOptional(String),
    /// An optional parameter while the variadic tail is required.
    #[error("parameter `{0}` cannot be optional if variadic parameters are required")]
    OptionalWithRequiredTail(String),
    /// The variadic tail is not right after the last parameter.
    #[error("expecting variadic parameters `{name}` at position {expected}, found {found}")]
    MisplacedTail {
        name: String,
        expected: usize,
        found: usize,
    },
    /// A parameter or option name that is not a valid identifier.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("duplicate parameter: {0}")]
    DuplicateParam(String),
    /// A flag that is not a single ASCII letter.
    #[error("invalid flag {flag:?} for option `{option}`: expecting a single letter")]
    InvalidFlag { option: String, flag: String },
    #[error("duplicate option flag: {0}")]
    DuplicateFlag(String),
    #[error("duplicate option: {0}")]
    DuplicateOption(String),
}

/// Validates a command schema.
///
/// Parameters are checked before options; the first problem found is
/// returned.
pub fn validate_schema(schema: &CommandSchema) -> Result<(), ConfigError> {
    validate_params(schema)?;
    validate_options(schema)
}

fn validate_params(schema: &CommandSchema) -> Result<(), ConfigError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let tail_required = schema.tail().is_some_and(|t| t.required);
    let mut has_optional = false;

    for (index, param) in schema.params().iter().enumerate() {
        if param.index() != index {
            return Err(ConfigError::MissingParamPosition(index));
        }

        if !NAME_RE.is_match(&param.name) {
            return Err(ConfigError::InvalidName(param.name.clone()));
        }

        if !seen.insert(param.name.as_str()) {
            return Err(ConfigError::DuplicateParam(param.name.clone()));
        }

        if param.required {
            if has_optional {
                return Err(ConfigError::RequiredAfterOptional(param.name.clone()));
            }
        } else {
            if tail_required {
                return Err(ConfigError::OptionalWithRequiredTail(param.name.clone()));
            }
            has_optional = true;
        }
    }

    if let Some(tail) = schema.tail() {
        if !NAME_RE.is_match(&tail.name) {
            return Err(ConfigError::InvalidName(tail.name.clone()));
        }

        if !seen.insert(tail.name.as_str()) {
            return Err(ConfigError::DuplicateParam(tail.name.clone()));
        }

        let expected = schema.params().len();
        let found = tail.position.unwrap_or(expected);
        if found != expected {
            return Err(ConfigError::MisplacedTail {
                name: tail.name.clone(),
                expected,
                found,
            });
        }
    }

    Ok(())
}

fn validate_options(schema: &CommandSchema) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    let mut flags = HashSet::new();

    for option in schema.options() {
        if !NAME_RE.is_match(&option.name) {
            return Err(ConfigError::InvalidName(option.name.clone()));
        }

        if !names.insert(option.name.as_str()) || !keys.insert(option.key.as_str()) {
            return Err(ConfigError::DuplicateOption(option.name.clone()));
        }

        if let Some(flag) = &option.flag {
            let mut chars = flag.chars();
            let valid = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic());
            if !valid {
                return Err(ConfigError::InvalidFlag {
                    option: option.name.clone(),
                    flag: flag.clone(),
                });
            }

            if !flags.insert(flag.as_str()) {
                return Err(ConfigError::DuplicateFlag(flag.clone()));
            }
        }
    }

    Ok(())
}
