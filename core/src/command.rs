//! The command contract and its invocation payload.
//!
//! A command is anything implementing [`Command`]: it exposes its schema and
//! is invoked with a [`Call`] whose arguments arrive in a fixed order:
//! positional values, the variadic tail (only if declared), the options
//! (only if any are declared), then the [`Context`] (only if requested).

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::cast::CastError;
use crate::types::CommandSchema;
use crate::value::Value;

/// Invocation context injected into commands that request it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Context {
    pub cwd: PathBuf,
    /// Command sequence, from the CLI name to the resolved leaf.
    pub commands: Vec<String>,
    /// Extension data filled by the CLI's context hook.
    pub extensions: BTreeMap<String, Value>,
}

impl Context {
    pub fn new(cwd: impl Into<PathBuf>, commands: Vec<String>) -> Self {
        Self {
            cwd: cwd.into(),
            commands,
            extensions: BTreeMap::new(),
        }
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

/// Bound option values keyed by option key.
///
/// Toggles are always present (`false` unless supplied); value options are
/// present when supplied or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundOptions(BTreeMap<String, Value>);

impl BoundOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One argument passed to [`Command::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Value(Value),
    Tail(Vec<Value>),
    Options(BoundOptions),
    Context(Context),
}

/// Ordered arguments of one command invocation.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{BoundOptions, Call, CallArg, Value};
///
/// let call = Call::new(vec![
///     CallArg::Value(Value::from("alice")),
///     CallArg::Tail(vec![Value::Number(1.0)]),
///     CallArg::Options(BoundOptions::new()),
/// ]);
/// assert_eq!(call.positional(0).and_then(Value::as_str), Some("alice"));
/// assert_eq!(call.tail().map(|t| t.len()), Some(1));
/// assert!(call.context().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    args: Vec<CallArg>,
}

impl Call {
    pub fn new(args: Vec<CallArg>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[CallArg] {
        &self.args
    }

    pub fn into_args(self) -> Vec<CallArg> {
        self.args
    }

    /// The `index`-th positional value.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Value(value) => Some(value),
                _ => None,
            })
            .nth(index)
    }

    pub fn tail(&self) -> Option<&[Value]> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Tail(items) => Some(items.as_slice()),
            _ => None,
        })
    }

    pub fn options(&self) -> Option<&BoundOptions> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Options(options) => Some(options),
            _ => None,
        })
    }

    pub fn context(&self) -> Option<&Context> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Context(context) => Some(context),
            _ => None,
        })
    }
}

/// What a command hands back to the shim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    None,
    Text(String),
    Value(Value),
    Json(serde_json::Value),
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Output::Value(value)
    }
}

/// Errors returned by a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A user-facing failure; printed without a stack of causes and exits
    /// with `code`.
    #[error("{message}")]
    Expected { message: String, code: i32 },
    #[error("{0}")]
    Other(Box<dyn StdError + Send + Sync>),
}

impl CommandError {
    pub fn expected(message: impl Into<String>) -> Self {
        CommandError::Expected {
            message: message.into(),
            code: 1,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        CommandError::Expected {
            message: message.into(),
            code,
        }
    }

    pub fn other(error: impl StdError + Send + Sync + 'static) -> Self {
        CommandError::Other(Box::new(error))
    }

    pub fn code(&self) -> i32 {
        match self {
            CommandError::Expected { code, .. } => *code,
            CommandError::Other(_) => 1,
        }
    }
}

impl From<CastError> for CommandError {
    fn from(err: CastError) -> Self {
        CommandError::Expected {
            message: err.message,
            code: err.code,
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Other(Box::new(err))
    }
}

/// An invocable command.
pub trait Command: Send + Sync {
    fn schema(&self) -> &CommandSchema;

    fn execute(&self, call: Call) -> Result<Output, CommandError>;
}

type Handler = dyn Fn(Call) -> Result<Output, CommandError> + Send + Sync;

/// A [`Command`] backed by a closure.
pub struct FnCommand {
    schema: CommandSchema,
    handler: Box<Handler>,
}

impl FnCommand {
    pub fn new<F>(schema: CommandSchema, handler: F) -> Self
    where
        F: Fn(Call) -> Result<Output, CommandError> + Send + Sync + 'static,
    {
        Self {
            schema,
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for FnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCommand")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Command for FnCommand {
    fn schema(&self) -> &CommandSchema {
        &self.schema
    }

    fn execute(&self, call: Call) -> Result<Output, CommandError> {
        (self.handler)(call)
    }
}

/// Shorthand for an `Arc`'d [`FnCommand`], the form registries take.
///
/// ```
/// use cmdtree_core::*;
///
/// let schema = CommandSchema::builder().brief("Say hi").build().unwrap();
/// let hello = command_fn(schema, |_| Ok(Output::from("hi")));
/// assert_eq!(hello.schema().brief(), Some("Say hi"));
/// ```
pub fn command_fn<F>(schema: CommandSchema, handler: F) -> std::sync::Arc<dyn Command>
where
    F: Fn(Call) -> Result<Output, CommandError> + Send + Sync + 'static,
{
    std::sync::Arc::new(FnCommand::new(schema, handler))
}
