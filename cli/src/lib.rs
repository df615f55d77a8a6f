//! Process shim and help rendering for cmdtree CLIs.
//!
//! [`Shim`] is what a binary's `main` calls: it runs a
//! [`Cli`](cmdtree_engine::Cli), prints results and help, and turns the
//! outcome into an exit code.
//!
//! ```no_run
//! use cmdtree_cli::Shim;
//! use cmdtree_core::{CommandSchema, Output, command_fn};
//! use cmdtree_engine::Cli;
//! use cmdtree_registry::{Namespace, Root};
//!
//! let hello = command_fn(CommandSchema::builder().build().unwrap(), |_| {
//!     Ok(Output::from("hello"))
//! });
//! let cli = Cli::builder("hello")
//!     .root(Root::new(Namespace::new().with_default(hello)))
//!     .build()
//!     .unwrap();
//!
//! std::process::exit(Shim::new(cli).execute(std::env::args()));
//! ```

pub mod render;
mod shim;

pub use render::{OutputFormat, format_help, format_output};
pub use shim::Shim;
