//! Help data.
//!
//! The engine never formats help text. It assembles a [`HelpInfo`] value
//! (usage fragments, parameter and option rows, subcommand groups) that a
//! renderer turns into output.

use std::collections::HashMap;

use cmdtree_core::CommandSchema;
use cmdtree_registry::{Registry, SubcommandEntry};
use serde::Serialize;

use crate::resolver::SearchContext;

/// One row of a parameter or option table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpRow {
    /// `name`, or the trigger of an option, e.g. `-p, --port <port>`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Visible subcommands of one root label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcommandGroup {
    pub label: String,
    pub subcommands: Vec<SubcommandEntry>,
}

impl SubcommandGroup {
    pub fn has_aliases(&self) -> bool {
        self.subcommands.iter().any(|s| !s.aliases.is_empty())
    }
}

/// Everything needed to render help for a command or a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HelpInfo {
    /// Command sequence from the CLI name to the current position.
    pub sequence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Usage line fragments; the first one is the joined sequence.
    pub usage: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<HelpRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<HelpRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<SubcommandGroup>,
}

impl HelpInfo {
    /// Help for a namespace: a `<subcommand>` usage line plus listings.
    pub fn for_namespace(
        sequence: &[String],
        description: Option<&str>,
        subcommands: Vec<SubcommandGroup>,
    ) -> Self {
        Self {
            sequence: sequence.to_vec(),
            description: description.map(str::to_string),
            usage: vec![sequence.join(" "), "<subcommand>".to_string()],
            parameters: Vec::new(),
            options: Vec::new(),
            subcommands,
        }
    }

    /// Help for a resolved command.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::*;
    /// use cmdtree_engine::HelpInfo;
    ///
    /// let schema = CommandSchema::builder()
    ///     .param(ParamDefinition::required("root", ValueType::String))
    ///     .param(ParamDefinition::optional("host", ValueType::String).with_default("localhost"))
    ///     .params(ParamsDefinition::new("extra", ValueType::String))
    ///     .option(OptionDefinition::new("port", ValueType::Number).required())
    ///     .option(OptionDefinition::toggle("verbose").with_flag("v"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let sequence = vec!["app".to_string(), "serve".to_string()];
    /// let help = HelpInfo::for_command(&sequence, &schema, Vec::new());
    /// assert_eq!(
    ///     help.usage_line(),
    ///     "app serve <root> [host=localhost] [...extra] --port <port> [...options]"
    /// );
    /// ```
    pub fn for_command(
        sequence: &[String],
        schema: &CommandSchema,
        subcommands: Vec<SubcommandGroup>,
    ) -> Self {
        let mut usage = vec![sequence.join(" ")];
        let mut parameters = Vec::new();

        for param in schema.params() {
            usage.push(if param.required {
                format!("<{}>", param.name)
            } else {
                match &param.default {
                    Some(default) => format!("[{}={default}]", param.name),
                    None => format!("[{}]", param.name),
                }
            });
            if let Some(desc) = &param.description {
                parameters.push(HelpRow {
                    name: param.name.clone(),
                    description: Some(desc.clone()),
                });
            }
        }

        if let Some(tail) = schema.tail() {
            usage.push(if tail.required {
                format!("<...{}>", tail.name)
            } else {
                format!("[...{}]", tail.name)
            });
            if let Some(desc) = &tail.description {
                parameters.push(HelpRow {
                    name: tail.name.clone(),
                    description: Some(desc.clone()),
                });
            }
        }

        let required: Vec<String> = schema
            .options()
            .iter()
            .filter(|o| o.required)
            .map(|o| format!("--{} <{}>", o.name, o.placeholder_text()))
            .collect();
        let has_optional = schema.options().len() > required.len();
        usage.extend(required);
        if has_optional {
            usage.push("[...options]".to_string());
        }

        let options = schema
            .options()
            .iter()
            .map(|option| {
                let mut trigger = option
                    .flag
                    .as_ref()
                    .map(|f| format!("-{f}, "))
                    .unwrap_or_default();
                trigger.push_str(&format!("--{}", option.name));
                if !option.toggle {
                    trigger.push_str(&format!(" <{}>", option.placeholder_text()));
                }

                let description = match (&option.description, &option.default) {
                    (Some(desc), Some(default)) => Some(format!("{desc} [{default}]")),
                    (None, Some(default)) => Some(format!("[{default}]")),
                    (desc, None) => desc.clone(),
                };
                HelpRow {
                    name: trigger,
                    description,
                }
            })
            .collect();

        Self {
            sequence: sequence.to_vec(),
            description: schema.description().map(str::to_string),
            usage,
            parameters,
            options,
            subcommands,
        }
    }

    pub fn usage_line(&self) -> String {
        self.usage.join(" ")
    }
}

/// Merges the subcommand listings of the live namespaces.
///
/// `contexts` are in priority order. When several roots list the same name
/// only the highest-priority entry is kept; it inherits a missing brief and
/// the aliases of the entries it overrides. Groups follow root declaration
/// order and merge by label. Hidden entries still override but are never
/// listed.
pub fn subcommand_groups(registry: &Registry, contexts: &[SearchContext]) -> Vec<SubcommandGroup> {
    // (context index in priority order, entries)
    let listings: Vec<(usize, &SearchContext, Vec<SubcommandEntry>)> = contexts
        .iter()
        .enumerate()
        .map(|(i, ctx)| (i, ctx, registry.subcommands(ctx.root, &ctx.path)))
        .collect();

    let mut winners: HashMap<&str, (usize, SubcommandEntry)> = HashMap::new();
    for (priority, _, entries) in &listings {
        for entry in entries {
            match winners.get_mut(entry.name.as_str()) {
                None => {
                    winners.insert(&entry.name, (*priority, entry.clone()));
                }
                Some((_, winner)) => {
                    if winner.brief.is_none() {
                        winner.brief = entry.brief.clone();
                    }
                    for alias in &entry.aliases {
                        if !winner.aliases.contains(alias) {
                            winner.aliases.push(alias.clone());
                        }
                    }
                }
            }
        }
    }

    let mut ordered: Vec<&(usize, &SearchContext, Vec<SubcommandEntry>)> = listings.iter().collect();
    ordered.sort_by_key(|(_, ctx, _)| ctx.root);

    let mut groups: Vec<SubcommandGroup> = Vec::new();
    for (priority, ctx, entries) in ordered {
        let visible: Vec<SubcommandEntry> = entries
            .iter()
            .filter_map(|entry| {
                let (winner_priority, winner) = winners.get(entry.name.as_str())?;
                (winner_priority == priority && !winner.hidden).then(|| winner.clone())
            })
            .collect();

        match groups.iter_mut().find(|g| g.label == ctx.label) {
            Some(group) => group.subcommands.extend(visible),
            None => groups.push(SubcommandGroup {
                label: ctx.label.clone(),
                subcommands: visible,
            }),
        }
    }

    groups.retain(|g| !g.subcommands.is_empty());
    groups
}
