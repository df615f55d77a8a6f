//! The `Cli` entry point: resolve, bind, dispatch.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use cmdtree_core::{Context, Output};
use cmdtree_registry::{CliConfig, Registry, Root};
use tracing::{debug, info};

use crate::binder::{Binder, Binding};
use crate::dispatch::dispatch;
use crate::error::{CliError, UsageError, UsageErrorKind};
use crate::help::{HelpInfo, subcommand_groups};
use crate::resolver::{Resolution, Resolver, SearchContext};

/// Maximum edit distance for "did you mean" hints.
const MAX_SUGGESTION_DISTANCE: usize = 2;

type ContextHook = dyn Fn(&mut Context) + Send + Sync;

/// Successful result of [`Cli::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// What the command returned.
    Output(Output),
    /// Help to show instead of running a command.
    Help {
        help: HelpInfo,
        /// `true` for `-h`, `-?` or `--help`; `false` when resolution
        /// stopped at a namespace without a default command.
        requested: bool,
    },
}

/// Builder for [`Cli`].
pub struct CliBuilder {
    name: String,
    roots: Vec<Root>,
    config: CliConfig,
    hook: Option<Arc<ContextHook>>,
}

impl CliBuilder {
    /// Adds a root. Roots are kept in declaration order.
    pub fn root(mut self, root: Root) -> Self {
        self.roots.push(root);
        self
    }

    pub fn config(mut self, config: CliConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a hook that fills [`Context::extensions`] per invocation.
    pub fn context_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Builds the registry, loading and validating every manifest.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] for alias conflicts, duplicate or invalid
    /// names, unknown explicit targets and unreadable manifest files.
    pub fn build(self) -> Result<Cli, CliError> {
        let registry = Registry::new(self.roots)?;
        info!(
            name = %self.name,
            roots = registry.roots().len(),
            priority = ?self.config.priority,
            "Built CLI"
        );
        Ok(Cli {
            name: self.name,
            registry,
            config: self.config,
            hook: self.hook,
        })
    }
}

/// A declarative CLI over one or more command roots.
pub struct Cli {
    name: String,
    registry: Registry,
    config: CliConfig,
    hook: Option<Arc<ContextHook>>,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.name)
            .field("roots", &self.registry.roots().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Cli {
    pub fn builder(name: &str) -> CliBuilder {
        CliBuilder {
            name: name.to_string(),
            roots: Vec::new(),
            config: CliConfig::default(),
            hook: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves `tokens` without binding or running anything.
    pub fn resolve(&self, tokens: &[String]) -> Resolution {
        Resolver::new(&self.name, &self.registry, &self.config).resolve(tokens)
    }

    /// Top-level help.
    pub fn help(&self) -> HelpInfo {
        let resolution = self.resolve(&[]);
        self.help_for(&resolution)
    }

    /// Runs one invocation. `tokens` excludes the program name; `cwd` is
    /// handed to castables and to the command's context.
    ///
    /// # Errors
    ///
    /// Usage errors carry the help to print after the message. Errors
    /// returned by the command are passed through as [`CliError::Command`].
    pub fn execute(&self, tokens: &[String], cwd: &Path) -> Result<Outcome, CliError> {
        let resolution = self.resolve(tokens);
        let help = self.help_for(&resolution);

        let Some(target) = &resolution.target else {
            if let Some(name) = &resolution.unknown {
                let suggestions = self.suggestions(name, &resolution.contexts);
                debug!(name = %name, suggestions = suggestions.len(), "Unknown subcommand");
                let kind = UsageErrorKind::UnknownSubcommand {
                    name: name.clone(),
                    suggestions,
                };
                return Err(UsageError::new(kind, help).into());
            }

            let requested = resolution
                .remaining
                .first()
                .is_some_and(|t| matches!(t.as_str(), "-h" | "-?" | "--help"));
            return Ok(Outcome::Help { help, requested });
        };

        let mut context = Context::new(cwd, resolution.sequence.clone());
        if let Some(hook) = &self.hook {
            hook(&mut context);
        }

        match Binder::new(target.command.schema()).bind(&resolution.remaining, &context) {
            Ok(Binding::Help) => Ok(Outcome::Help {
                help,
                requested: true,
            }),
            Ok(Binding::Bound(args)) => {
                let output = dispatch(target.command.as_ref(), args)?;
                Ok(Outcome::Output(output))
            }
            Err(kind) => Err(UsageError::new(kind, help).into()),
        }
    }

    fn help_for(&self, resolution: &Resolution) -> HelpInfo {
        let groups = subcommand_groups(&self.registry, &resolution.contexts);
        match &resolution.target {
            Some(target) => {
                HelpInfo::for_command(&resolution.sequence, target.command.schema(), groups)
            }
            None => {
                let description = resolution.contexts.iter().find_map(|ctx| {
                    self.registry
                        .namespace(ctx.root, &ctx.path)?
                        .description()
                });
                HelpInfo::for_namespace(&resolution.sequence, description, groups)
            }
        }
    }

    /// Visible names and aliases of the live namespaces close to `name`.
    fn suggestions(&self, name: &str, contexts: &[SearchContext]) -> Vec<String> {
        if !self.config.suggest_subcommands {
            return Vec::new();
        }

        let mut candidates: Vec<(usize, String)> = contexts
            .iter()
            .flat_map(|ctx| self.registry.subcommands(ctx.root, &ctx.path))
            .filter(|entry| !entry.hidden)
            .flat_map(|entry| std::iter::once(entry.name).chain(entry.aliases))
            .map(|candidate| (strsim::levenshtein(name, &candidate), candidate))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .collect();

        candidates.sort();
        candidates.dedup_by(|a, b| a.1 == b.1);
        candidates.into_iter().map(|(_, candidate)| candidate).collect()
    }
}
