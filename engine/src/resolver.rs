//! Multi-root command resolution.
//!
//! Tokens are consumed left to right against every live root at once.
//! Each token is probed in all live namespaces (concurrently, joined before
//! the next token); roots without a match drop out, roots with a namespace
//! match narrow into it, and the first leaf ends the scan.
//!
//! Leaf ranking: a leaf named by a manifest's explicit target beats an
//! implicitly discovered one; among equals the root with the highest
//! priority wins. When no leaf is found, the highest-priority namespace
//! default among the live namespaces is used.

use std::sync::Arc;

use cmdtree_core::{Command, NAME_RE};
use cmdtree_registry::{CliConfig, Lookup, Registry};
use rayon::prelude::*;
use tracing::debug;

/// A live namespace during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    pub root: usize,
    /// Label of the root, used to group listings.
    pub label: String,
    /// Canonical path of the namespace inside the root.
    pub path: Vec<String>,
}

/// How a target was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Named by a manifest record's explicit target.
    Explicit,
    /// A command child found by name.
    Implicit,
    /// The default command of the namespace where resolution stopped.
    NamespaceDefault,
}

/// The command an invocation resolved to.
#[derive(Clone)]
pub struct ResolvedTarget {
    pub command: Arc<dyn Command>,
    pub root: usize,
    pub kind: TargetKind,
}

impl std::fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTarget")
            .field("root", &self.root)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Why scanning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    /// A leaf command matched.
    Resolved,
    /// The next token is not a command name (or no live root remains).
    Stopped,
    /// The next token looked like a command name but matched nothing.
    Unknown,
    /// All tokens were consumed as namespace names.
    Exhausted,
}

/// Result of resolving one token vector.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub state: ResolveState,
    /// CLI name followed by the canonical names consumed.
    pub sequence: Vec<String>,
    /// Tokens left for the argument binder.
    pub remaining: Vec<String>,
    /// Resolved leaf, or the namespace default that applies.
    pub target: Option<ResolvedTarget>,
    /// Live namespaces when scanning stopped, in priority order.
    pub contexts: Vec<SearchContext>,
    /// The token that matched nothing, when no default applies.
    pub unknown: Option<String>,
}

impl Resolution {
    /// Canonical `(sequence, remaining, root, kind)` view, for comparing
    /// resolutions.
    pub fn summary(&self) -> (Vec<String>, Vec<String>, Option<(usize, TargetKind)>) {
        (
            self.sequence.clone(),
            self.remaining.clone(),
            self.target.as_ref().map(|t| (t.root, t.kind)),
        )
    }
}

/// Resolves tokens against a registry.
pub struct Resolver<'a> {
    name: &'a str,
    registry: &'a Registry,
    config: &'a CliConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(name: &'a str, registry: &'a Registry, config: &'a CliConfig) -> Self {
        Self {
            name,
            registry,
            config,
        }
    }

    /// Live contexts before any token is consumed.
    pub fn initial_contexts(&self) -> Vec<SearchContext> {
        self.config
            .priority
            .order(self.registry.roots().len())
            .into_iter()
            .filter_map(|root| {
                Some(SearchContext {
                    root,
                    label: self.registry.root(root)?.label().to_string(),
                    path: Vec::new(),
                })
            })
            .collect()
    }

    pub fn resolve(&self, tokens: &[String]) -> Resolution {
        let mut contexts = self.initial_contexts();
        let mut sequence = vec![self.name.to_string()];
        let mut consumed = 0;
        let mut unknown = None;
        let mut state = ResolveState::Exhausted;
        let mut leaf = None;

        for token in tokens {
            if contexts.is_empty() || !NAME_RE.is_match(token) {
                state = ResolveState::Stopped;
                break;
            }

            let name = self.registry.canonical(
                contexts.iter().map(|ctx| (ctx.root, ctx.path.as_slice())),
                token,
            );
            if name != *token {
                debug!(alias = %token, name = %name, "Rewrote alias");
            }

            debug!(name = %name, live_roots = contexts.len(), "Probing roots");
            let probes = self.probe(&contexts, &name);

            if probes.iter().all(|p| !p.is_match()) {
                debug!(token = %token, "No root matched");
                unknown = Some(token.clone());
                state = ResolveState::Unknown;
                break;
            }

            let best_leaf = probes
                .iter()
                .enumerate()
                .filter_map(|(i, probe)| match probe {
                    Lookup::Leaf {
                        command, explicit, ..
                    } => Some((i, command, *explicit)),
                    _ => None,
                })
                .min_by_key(|(i, _, explicit)| (!explicit, *i));

            consumed += 1;
            sequence.push(name);

            if let Some((i, command, explicit)) = best_leaf {
                leaf = Some(ResolvedTarget {
                    command: Arc::clone(command),
                    root: contexts[i].root,
                    kind: if explicit {
                        TargetKind::Explicit
                    } else {
                        TargetKind::Implicit
                    },
                });
                contexts = narrow(&contexts, &probes);
                state = ResolveState::Resolved;
                break;
            }

            contexts = narrow(&contexts, &probes);
        }

        let remaining = tokens[consumed..].to_vec();

        let target = leaf.or_else(|| {
            contexts.iter().find_map(|ctx| {
                let command = self
                    .registry
                    .namespace(ctx.root, &ctx.path)?
                    .default_command()?;
                Some(ResolvedTarget {
                    command: Arc::clone(command),
                    root: ctx.root,
                    kind: TargetKind::NamespaceDefault,
                })
            })
        });

        // A default swallows the unknown token as an argument.
        let unknown = if target.is_some() { None } else { unknown };

        debug!(
            sequence = ?sequence,
            remaining = remaining.len(),
            state = ?state,
            resolved = target.is_some(),
            "Resolution finished"
        );

        Resolution {
            state,
            sequence,
            remaining,
            target,
            contexts,
            unknown,
        }
    }

    /// Looks the canonical `name` up in every live context, preserving
    /// priority order.
    fn probe(&self, contexts: &[SearchContext], name: &str) -> Vec<Lookup> {
        let lookup = |ctx: &SearchContext| self.registry.lookup(ctx.root, &ctx.path, name);
        if self.config.parallel_probes && contexts.len() > 1 {
            contexts.par_iter().map(lookup).collect()
        } else {
            contexts.iter().map(lookup).collect()
        }
    }
}

/// Keeps the contexts whose probe matched a namespace, descending into it.
fn narrow(contexts: &[SearchContext], probes: &[Lookup]) -> Vec<SearchContext> {
    contexts
        .iter()
        .zip(probes)
        .filter_map(|(ctx, probe)| match probe {
            Lookup::Namespace { name } => {
                let mut path = ctx.path.clone();
                path.push(name.clone());
                Some(SearchContext {
                    root: ctx.root,
                    label: ctx.label.clone(),
                    path,
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cmdtree_core::{CommandSchema, Output, command_fn};
    use cmdtree_registry::{Namespace, Priority, Root, SubcommandDefinition};

    use super::*;

    fn noop(brief: &str) -> Arc<dyn Command> {
        let schema = CommandSchema::builder().brief(brief).build().unwrap();
        command_fn(schema, |_| Ok(Output::None))
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn brief_of(resolution: &Resolution) -> Option<String> {
        resolution
            .target
            .as_ref()
            .and_then(|t| t.command.schema().brief().map(str::to_string))
    }

    fn two_roots() -> Registry {
        Registry::new(vec![
            Root::new(
                Namespace::new()
                    .with_command("view", noop("A view"))
                    .with_namespace(
                        "bar",
                        Namespace::new().with_command("pia-pia", noop("A pia")),
                    ),
            ),
            Root::new(
                Namespace::new()
                    .with_command("view", noop("B view"))
                    .with_namespace("bar", Namespace::new().with_default(noop("B bar default"))),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_priority_decides_between_leaves() {
        let registry = two_roots();

        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);
        let resolution = resolver.resolve(&tokens(&["view", "foo"]));
        assert_eq!(resolution.state, ResolveState::Resolved);
        assert_eq!(brief_of(&resolution).as_deref(), Some("B view"));
        assert_eq!(resolution.remaining, vec!["foo"]);
        assert_eq!(resolution.sequence, vec!["app", "view"]);

        let config = CliConfig {
            priority: Priority::FirstDeclared,
            ..CliConfig::default()
        };
        let resolver = Resolver::new("app", &registry, &config);
        let resolution = resolver.resolve(&tokens(&["view", "foo"]));
        assert_eq!(brief_of(&resolution).as_deref(), Some("A view"));
    }

    #[test]
    fn test_namespaces_narrow_across_roots() {
        let registry = two_roots();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let resolution = resolver.resolve(&tokens(&["bar", "pia-pia", "x"]));
        assert_eq!(resolution.sequence, vec!["app", "bar", "pia-pia"]);
        assert_eq!(brief_of(&resolution).as_deref(), Some("A pia"));
        assert_eq!(resolution.target.as_ref().unwrap().root, 0);

        let resolution = resolver.resolve(&tokens(&["bar"]));
        assert_eq!(resolution.state, ResolveState::Exhausted);
        assert_eq!(brief_of(&resolution).as_deref(), Some("B bar default"));
        assert_eq!(resolution.contexts.len(), 2);
    }

    #[test]
    fn test_unknown_token_without_default() {
        let registry = two_roots();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let resolution = resolver.resolve(&tokens(&["nope", "view"]));
        assert_eq!(resolution.state, ResolveState::Unknown);
        assert_eq!(resolution.unknown.as_deref(), Some("nope"));
        assert!(resolution.target.is_none());
        assert_eq!(resolution.remaining, vec!["nope", "view"]);
    }

    #[test]
    fn test_unknown_token_falls_back_to_default() {
        let registry = two_roots();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let resolution = resolver.resolve(&tokens(&["bar", "zzz"]));
        assert_eq!(resolution.state, ResolveState::Unknown);
        assert!(resolution.unknown.is_none());
        assert_eq!(resolution.target.as_ref().unwrap().kind, TargetKind::NamespaceDefault);
        assert_eq!(resolution.remaining, vec!["zzz"]);
    }

    #[test]
    fn test_non_name_token_stops_scanning() {
        let registry = two_roots();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let resolution = resolver.resolve(&tokens(&["--help"]));
        assert_eq!(resolution.state, ResolveState::Stopped);
        assert_eq!(resolution.remaining, vec!["--help"]);
        assert_eq!(resolution.sequence, vec!["app"]);
    }

    #[test]
    fn test_explicit_target_beats_higher_priority_implicit_leaf() {
        let registry = Registry::new(vec![
            Root::new(
                Namespace::new()
                    .with_subcommand(SubcommandDefinition::new("run").with_target("run-impl")),
            )
            .with_target("run-impl", noop("Explicit run")),
            Root::new(Namespace::new().with_command("run", noop("Implicit run"))),
        ])
        .unwrap();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let resolution = resolver.resolve(&tokens(&["run"]));
        assert_eq!(brief_of(&resolution).as_deref(), Some("Explicit run"));
        assert_eq!(resolution.target.unwrap().kind, TargetKind::Explicit);
    }

    #[test]
    fn test_alias_follows_root_priority() {
        let registry = Registry::new(vec![
            Root::new(
                Namespace::new()
                    .with_command("view", noop("Core view"))
                    .with_subcommand(SubcommandDefinition::new("view").with_alias("v")),
            ),
            Root::new(Namespace::new().with_command("view", noop("Extension view"))),
        ])
        .unwrap();
        let config = CliConfig::default();
        let resolver = Resolver::new("app", &registry, &config);

        let by_alias = resolver.resolve(&tokens(&["v", "x"]));
        let by_name = resolver.resolve(&tokens(&["view", "x"]));
        assert_eq!(by_alias.summary(), by_name.summary());
        assert_eq!(by_alias.sequence, vec!["app", "view"]);
        assert_eq!(brief_of(&by_alias).as_deref(), Some("Extension view"));
    }

    #[test]
    fn test_parallel_and_sequential_probes_agree() {
        let registry = two_roots();
        let parallel = CliConfig::default();
        let sequential = CliConfig {
            parallel_probes: false,
            ..CliConfig::default()
        };

        for input in [&["view", "a"][..], &["bar", "pia-pia"][..], &["bar"][..], &["x-y"][..]] {
            let input = tokens(input);
            let a = Resolver::new("app", &registry, &parallel).resolve(&input);
            let b = Resolver::new("app", &registry, &sequential).resolve(&input);
            assert_eq!(a.summary(), b.summary());
            assert_eq!(a.unknown, b.unknown);
        }
    }
}
