//! Runtime values produced by casting.
//!
//! Commands are declared at runtime, so bound arguments are carried as a
//! small closed [`Value`] enum rather than as per-command structs. Values
//! serialize to plain JSON (`untagged`) so command output can be echoed
//! verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cast::CastError;

/// A cast argument value.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Value;
///
/// let port = Value::Number(5555.0);
/// assert_eq!(port.as_f64(), Some(5555.0));
/// assert_eq!(port.as_str(), None);
/// assert_eq!(Value::from("alice").as_str(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (an optional parameter without a default).
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Path(PathValue),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathValue> {
        match self {
            Value::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Path(path) => f.write_str(&path.source),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Default value declared for a parameter or option.
///
/// A `Raw` default goes through the casting contract exactly as if the user
/// had typed it; a `Literal` default is used as is.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Raw(String),
    Literal(Value),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Raw(raw) => f.write_str(raw),
            DefaultValue::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// What a [`PathValue`] is expected to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Directory,
}

/// A filesystem path argument resolved against the invocation cwd.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathValue {
    /// The string the user (or the default) supplied.
    pub source: String,
    /// `source` joined onto the invocation cwd.
    pub full_path: PathBuf,
    pub kind: PathKind,
    /// Whether the value came from a declared default.
    pub from_default: bool,
}

impl PathValue {
    pub fn new(source: &str, cwd: &Path, kind: PathKind, from_default: bool) -> Self {
        Self {
            source: source.to_string(),
            full_path: cwd.join(source),
            kind,
            from_default,
        }
    }

    /// File name component of the source path.
    pub fn base_name(&self) -> Option<&str> {
        Path::new(&self.source).file_name().and_then(|n| n.to_str())
    }

    /// Checks existence (or absence, with `exists = false`) of the path.
    ///
    /// Unreadable metadata is treated the same as a missing path.
    pub fn assert(&self, exists: bool) -> Result<(), CastError> {
        let metadata = std::fs::metadata(&self.full_path).ok();

        match (exists, metadata) {
            (true, None) => Err(CastError::new(match self.kind {
                PathKind::File => format!("File \"{}\" does not exist", self.source),
                PathKind::Directory => format!("Directory \"{}\" does not exist", self.source),
            })),
            (true, Some(meta)) => {
                let matches = match self.kind {
                    PathKind::File => meta.is_file(),
                    PathKind::Directory => meta.is_dir(),
                };
                if matches {
                    Ok(())
                } else {
                    let expected = match self.kind {
                        PathKind::File => "a file",
                        PathKind::Directory => "a directory",
                    };
                    Err(CastError::new(format!(
                        "Object \"{}\" is expected to be {expected}",
                        self.source
                    )))
                }
            }
            (false, Some(_)) => Err(CastError::new(format!(
                "Object \"{}\" already exists",
                self.source
            ))),
            (false, None) => Ok(()),
        }
    }

    /// Reads the file as UTF-8 text after asserting it exists.
    pub fn text(&self) -> Result<String, CastError> {
        self.assert(true)?;
        std::fs::read_to_string(&self.full_path)
            .map_err(|e| CastError::new(format!("Error reading file \"{}\": {e}", self.source)))
    }
}
