//! Command resolution, argument binding and dispatch.
//!
//! A [`Cli`] owns a [`Registry`](cmdtree_registry::Registry) of one or more
//! roots. [`Cli::execute`] walks the tokens through every live root at once
//! (the [`Resolver`]), binds what is left against the resolved command's
//! schema (the [`Binder`]) and invokes the command ([`dispatch`]).
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use cmdtree_core::*;
//! use cmdtree_engine::{Cli, Outcome};
//! use cmdtree_registry::{Namespace, Root};
//!
//! let schema = CommandSchema::builder()
//!     .brief("Add numbers")
//!     .params(ParamsDefinition::new("numbers", ValueType::Number).required())
//!     .build()
//!     .unwrap();
//! let add = command_fn(schema, |call| {
//!     let sum: f64 = call.tail().unwrap_or_default().iter().filter_map(Value::as_f64).sum();
//!     Ok(Output::from(Value::Number(sum)))
//! });
//!
//! let cli = Cli::builder("calc")
//!     .root(Root::new(Namespace::new().with_command("add", add)))
//!     .build()
//!     .unwrap();
//!
//! let tokens: Vec<String> = ["add", "1", "2", "3"].iter().map(|s| s.to_string()).collect();
//! let outcome = cli.execute(&tokens, Path::new(".")).unwrap();
//! assert_eq!(outcome, Outcome::Output(Output::Value(Value::Number(6.0))));
//! ```

mod binder;
mod cli;
mod dispatch;
mod error;
mod help;
mod resolver;

pub use binder::{Binder, Binding, BoundArguments, is_option_like};
pub use cli::{Cli, CliBuilder, Outcome};
pub use dispatch::{build_call, dispatch};
pub use error::{CliError, UsageError, UsageErrorKind};
pub use help::{HelpInfo, HelpRow, SubcommandGroup, subcommand_groups};
pub use resolver::{
    ResolveState, Resolution, ResolvedTarget, Resolver, SearchContext, TargetKind,
};
