//! The casting contract shared by parameters and options.
//!
//! Every raw string (from a token or from a string default) goes through
//! [`cast`]: built-in handling for `String`, `Number` and `Bool`, delegation
//! to a [`Castable`] for anything else, then every declared [`Validator`] in
//! declaration order. The first failing validator aborts the cast.
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use cmdtree_core::{CastingContext, Value, ValueType, cast};
//!
//! let ctx = CastingContext::new("port", "8080", &[], false, Path::new("."), &[]);
//! assert_eq!(cast("8080", &ValueType::Number, &ctx).unwrap(), Value::Number(8080.0));
//!
//! let ctx = CastingContext::new("port", "abc", &[], false, Path::new("."), &[]);
//! assert!(cast("abc", &ValueType::Number, &ctx).is_err());
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::value::Value;

/// A failed cast or validation.
///
/// These are "expected" errors: the message is meant for the end user and
/// the process exits with [`code`](CastError::code).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CastError {
    pub message: String,
    pub code: i32,
}

impl CastError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 1,
        }
    }
}

/// Name and raw source of the field being validated.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'a str,
    pub source: &'a str,
}

/// Validator callback receiving the cast value.
pub trait Validate: Send + Sync {
    fn validate(&self, value: &Value, field: Field<'_>) -> Result<(), CastError>;
}

impl<F> Validate for F
where
    F: Fn(&Value, Field<'_>) -> Result<(), CastError> + Send + Sync,
{
    fn validate(&self, value: &Value, field: Field<'_>) -> Result<(), CastError> {
        self(value, field)
    }
}

/// A declared validator.
///
/// `Pattern` is tested against the raw source string; `Custom` receives the
/// cast value.
#[derive(Clone)]
pub enum Validator {
    Pattern(Regex),
    Custom(Arc<dyn Validate>),
}

impl Validator {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Validator::Pattern(Regex::new(pattern)?))
    }

    /// Wraps a validator callback.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, Field<'_>) -> Result<(), CastError> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(f))
    }

    /// Wraps a validator object.
    pub fn object(validator: impl Validate + 'static) -> Self {
        Validator::Custom(Arc::new(validator))
    }

    pub fn check(&self, value: &Value, field: Field<'_>) -> Result<(), CastError> {
        match self {
            Validator::Pattern(re) => {
                if re.is_match(field.source) {
                    Ok(())
                } else {
                    Err(CastError::new(format!("Invalid value for \"{}\"", field.name)))
                }
            }
            Validator::Custom(validator) => validator.validate(value, field),
        }
    }
}

impl From<Regex> for Validator {
    fn from(re: Regex) -> Self {
        Validator::Pattern(re)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Validator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Context handed to a [`Castable`] implementation.
#[derive(Debug, Clone, Copy)]
pub struct CastingContext<'a> {
    /// Field name used in error messages.
    pub name: &'a str,
    /// The raw string being cast.
    pub source: &'a str,
    /// Validators declared for the field.
    pub validators: &'a [Validator],
    /// Whether `source` came from a declared default.
    pub default: bool,
    /// Working directory of the invocation.
    pub cwd: &'a Path,
    /// Command sequence of the invocation.
    pub commands: &'a [String],
}

impl<'a> CastingContext<'a> {
    pub fn new(
        name: &'a str,
        source: &'a str,
        validators: &'a [Validator],
        default: bool,
        cwd: &'a Path,
        commands: &'a [String],
    ) -> Self {
        Self {
            name,
            source,
            validators,
            default,
            cwd,
            commands,
        }
    }

    /// Derives a context for a nested value, e.g. one element of a list.
    pub fn nested<'b>(
        &self,
        name: &'b str,
        source: &'b str,
        validators: &'b [Validator],
    ) -> CastingContext<'b>
    where
        'a: 'b,
    {
        CastingContext {
            name,
            source,
            validators,
            default: self.default,
            cwd: self.cwd,
            commands: self.commands,
        }
    }
}

/// Conversion from a raw string to a typed [`Value`].
pub trait Castable: Send + Sync {
    /// Name shown in usage and error text.
    fn type_name(&self) -> &str;

    fn cast(&self, raw: &str, ctx: &CastingContext<'_>) -> Result<Value, CastError>;
}

/// Declared type of a parameter or option.
#[derive(Clone)]
pub enum ValueType {
    String,
    Number,
    Bool,
    Custom(Arc<dyn Castable>),
}

impl ValueType {
    pub fn custom(castable: impl Castable + 'static) -> Self {
        ValueType::Custom(Arc::new(castable))
    }

    pub fn name(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Bool => "boolean",
            ValueType::Custom(castable) => castable.type_name(),
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Custom(castable) => write!(f, "Custom({})", castable.type_name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Casts `raw` to `value_type`, then runs `ctx.validators` in order.
pub fn cast(raw: &str, value_type: &ValueType, ctx: &CastingContext<'_>) -> Result<Value, CastError> {
    let value = match value_type {
        ValueType::String => Value::String(raw.to_string()),
        ValueType::Number => match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => {
                return Err(CastError::new(format!(
                    "Value \"{raw}\" cannot be casted to number"
                )));
            }
        },
        ValueType::Bool => Value::Bool(parse_bool(raw)),
        ValueType::Custom(castable) => castable.cast(raw, ctx)?,
    };

    let field = Field {
        name: ctx.name,
        source: raw,
    };
    for validator in ctx.validators {
        validator.check(&value, field)?;
    }

    Ok(value)
}

/// Parses a number the way a lenient CLI user expects.
///
/// Leading/trailing whitespace is ignored, an empty string is zero, and
/// `0x`/`0o`/`0b` prefixes and `Infinity` are accepted. Returns `None` for
/// anything that is not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // Rust also accepts "inf"/"nan" spellings.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// `f`/`false` (any case) are false; other numeric strings are false when
/// zero; everything else is true.
pub fn parse_bool(raw: &str) -> bool {
    if raw.eq_ignore_ascii_case("f") || raw.eq_ignore_ascii_case("false") {
        return false;
    }
    match parse_number(raw) {
        Some(n) => n != 0.0,
        None => true,
    }
}
