//! Built-in [`Castable`] implementations.

use chrono::{DateTime, NaiveDate, Utc};

use crate::cast::{CastError, Castable, CastingContext, Validator, ValueType, cast};
use crate::value::{PathKind, PathValue, Value};

/// Splits the input and casts every part with an element type.
///
/// Element validators run on each element; the field's own validators run
/// on the resulting list.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cmdtree_core::*;
///
/// let ports = ListOf::new(ValueType::Number);
/// let ctx = CastingContext::new("ports", "80, 443,", &[], false, Path::new("."), &[]);
/// let value = ports.cast("80, 443,", &ctx).unwrap();
/// assert_eq!(value, Value::List(vec![Value::Number(80.0), Value::Number(443.0)]));
/// ```
#[derive(Debug, Clone)]
pub struct ListOf {
    element: ValueType,
    separator: String,
    trim: bool,
    keep_empty: bool,
    validators: Vec<Validator>,
    type_name: String,
}

impl ListOf {
    pub fn new(element: ValueType) -> Self {
        let type_name = format!("{}[]", element.name());
        Self {
            element,
            separator: ",".to_string(),
            trim: true,
            keep_empty: false,
            validators: Vec::new(),
            type_name,
        }
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Keeps surrounding whitespace of each part.
    pub fn without_trim(mut self) -> Self {
        self.trim = false;
        self
    }

    pub fn keep_empty(mut self) -> Self {
        self.keep_empty = true;
        self
    }

    /// Adds a validator applied to every element.
    pub fn with_element_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

impl Castable for ListOf {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn cast(&self, raw: &str, ctx: &CastingContext<'_>) -> Result<Value, CastError> {
        let element_name = format!("element of {}", ctx.name);
        let mut items = Vec::new();

        for part in raw.split(self.separator.as_str()) {
            let part = if self.trim { part.trim() } else { part };
            if part.is_empty() && !self.keep_empty {
                continue;
            }
            let nested = ctx.nested(&element_name, part, &self.validators);
            items.push(cast(part, &self.element, &nested)?);
        }

        Ok(Value::List(items))
    }
}

/// Comma separated strings, trimmed, empties dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaSeparated;

impl Castable for CommaSeparated {
    fn type_name(&self) -> &str {
        "strings"
    }

    fn cast(&self, raw: &str, _ctx: &CastingContext<'_>) -> Result<Value, CastError> {
        Ok(Value::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .collect(),
        ))
    }
}

/// A file path resolved against the invocation cwd. Existence is not
/// checked at cast time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePath;

impl Castable for FilePath {
    fn type_name(&self) -> &str {
        "file"
    }

    fn cast(&self, raw: &str, ctx: &CastingContext<'_>) -> Result<Value, CastError> {
        Ok(Value::Path(PathValue::new(raw, ctx.cwd, PathKind::File, ctx.default)))
    }
}

/// A directory path resolved against the invocation cwd.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirPath;

impl Castable for DirPath {
    fn type_name(&self) -> &str {
        "directory"
    }

    fn cast(&self, raw: &str, ctx: &CastingContext<'_>) -> Result<Value, CastError> {
        Ok(Value::Path(PathValue::new(
            raw,
            ctx.cwd,
            PathKind::Directory,
            ctx.default,
        )))
    }
}

/// An RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp;

impl Castable for Timestamp {
    fn type_name(&self) -> &str {
        "timestamp"
    }

    fn cast(&self, raw: &str, ctx: &CastingContext<'_>) -> Result<Value, CastError> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Value::Timestamp(ts.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Value::Timestamp(dt.and_utc()))
            .ok_or_else(|| {
                CastError::new(format!(
                    "Value \"{raw}\" of \"{}\" is not a valid timestamp",
                    ctx.name
                ))
            })
    }
}
