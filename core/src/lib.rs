//! Command schemas and the casting contract.
//!
//! This crate defines what a command declares and how raw strings become
//! typed values:
//!
//! - [`CommandSchema`]: positional parameters, an optional variadic tail,
//!   named options and toggles, built through [`CommandSchemaBuilder`].
//! - [`ConfigError`]: malformed declarations, raised when a schema is built.
//! - [`cast`] and [`Castable`]: the per-type conversion protocol, with
//!   [`Validator`]s run in declaration order after every cast.
//! - [`castable`] and [`validation`]: built-in list, path and timestamp
//!   types, and range/integer/IP validators.
//! - [`Command`]: the invocable contract, receiving a [`Call`].
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use cmdtree_core::*;
//!
//! let schema = CommandSchema::builder()
//!     .brief("Serve a directory")
//!     .param(ParamDefinition::required("root", ValueType::custom(DirPath)))
//!     .option(
//!         OptionDefinition::new("port", ValueType::Number)
//!             .with_default("5555")
//!             .with_validator(validation::integer()),
//!     )
//!     .option(OptionDefinition::toggle("verbose").with_flag("v"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.required_params(), 1);
//! assert_eq!(schema.find_option_by_flag("v").unwrap().key, "verbose");
//!
//! let port = schema.find_option("port").unwrap();
//! let ctx = CastingContext::new("port", "8080", &port.validators, false, Path::new("."), &[]);
//! assert_eq!(cast("8080", &port.value_type, &ctx).unwrap(), Value::Number(8080.0));
//! ```

mod cast;
pub mod castable;
mod command;
mod types;
mod validate;
pub mod validation;
mod value;

pub use cast::{
    CastError, Castable, CastingContext, Field, Validate, Validator, ValueType, cast,
    parse_bool, parse_number,
};
pub use castable::{CommaSeparated, DirPath, FilePath, ListOf, Timestamp};
pub use command::{
    BoundOptions, Call, CallArg, Command, CommandError, Context, FnCommand, Output, command_fn,
};
pub use types::*;
pub use validate::{ConfigError, NAME_RE, validate_schema};
pub use value::{DefaultValue, PathKind, PathValue, Value};
