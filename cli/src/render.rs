//! Output formatting for help and command results.

use cmdtree_core::{Output, Value};
use cmdtree_engine::{HelpInfo, HelpRow, SubcommandGroup};

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Formats help in the requested output format.
pub fn format_help(help: &HelpInfo, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(help_to_text(help)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(help).map_err(|e| format!("JSON serialization failed: {e}"))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(help).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Formats a command result. Returns `None` when there is nothing to print.
pub fn format_output(output: &Output, format: OutputFormat) -> Result<Option<String>, String> {
    match (output, format) {
        (Output::None, _) => Ok(None),
        (Output::Text(text), _) => Ok(Some(text.clone())),
        (Output::Value(value), OutputFormat::Text) => Ok(Some(value_to_text(value))),
        (Output::Json(json), OutputFormat::Text | OutputFormat::Json) => {
            serde_json::to_string_pretty(json)
                .map(Some)
                .map_err(|e| format!("JSON serialization failed: {e}"))
        }
        (_, OutputFormat::Json) => serde_json::to_string_pretty(output)
            .map(Some)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        (_, OutputFormat::Yaml) => serde_yaml::to_string(output)
            .map(|s| Some(s.trim_end().to_string()))
            .map_err(|e| format!("YAML serialization failed: {e}")),
    }
}

/// Lists print one element per line.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::List(items) => items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn help_to_text(help: &HelpInfo) -> String {
    let mut out = String::new();

    out.push_str("USAGE\n\n");
    out.push_str(&format!("  {}\n", help.usage_line()));

    if let Some(ref desc) = help.description {
        out.push_str(&format!("\n  {desc}\n"));
    }

    if !help.parameters.is_empty() {
        out.push_str("\nPARAMETERS\n\n");
        push_rows(&mut out, &help.parameters);
    }

    if !help.options.is_empty() {
        out.push_str("\nOPTIONS\n\n");
        push_rows(&mut out, &help.options);
    }

    for group in &help.subcommands {
        out.push_str(&format!("\n{}\n\n", group.label.to_uppercase()));
        push_rows(&mut out, &group_rows(group));
    }

    out
}

fn group_rows(group: &SubcommandGroup) -> Vec<HelpRow> {
    group
        .subcommands
        .iter()
        .map(|entry| {
            let mut name = entry.name.clone();
            for alias in &entry.aliases {
                name.push_str(&format!(", {alias}"));
            }
            HelpRow {
                name,
                description: entry.brief.clone(),
            }
        })
        .collect()
}

fn push_rows(out: &mut String, rows: &[HelpRow]) {
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(4);
    for row in rows {
        match &row.description {
            Some(desc) => out.push_str(&format!("  {:<width$}  {desc}\n", row.name)),
            None => out.push_str(&format!("  {}\n", row.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use cmdtree_core::{CommandSchema, OptionDefinition, ParamDefinition, ValueType};
    use cmdtree_registry::SubcommandEntry;

    use super::*;

    fn sample_help() -> HelpInfo {
        let schema = CommandSchema::builder()
            .description("Serve a directory")
            .param(ParamDefinition::required("root", ValueType::String).with_description("Directory"))
            .option(
                OptionDefinition::new("port", ValueType::Number)
                    .with_flag("p")
                    .with_default("5555")
                    .with_description("Port"),
            )
            .build()
            .unwrap();
        let groups = vec![SubcommandGroup {
            label: "Subcommands".to_string(),
            subcommands: vec![SubcommandEntry {
                name: "view".to_string(),
                aliases: vec!["v".to_string()],
                brief: Some("Show things".to_string()),
                hidden: false,
            }],
        }];
        HelpInfo::for_command(&["app".to_string(), "serve".to_string()], &schema, groups)
    }

    #[test]
    fn test_help_text_sections() {
        let text = format_help(&sample_help(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("USAGE\n\n  app serve <root> [...options]\n"));
        assert!(text.contains("\n  Serve a directory\n"));
        assert!(text.contains("PARAMETERS\n\n  root  Directory\n"));
        assert!(text.contains("OPTIONS\n\n  -p, --port <port>  Port [5555]\n"));
        assert!(text.contains("SUBCOMMANDS\n\n  view, v  Show things\n"));
    }

    #[test]
    fn test_help_json_has_usage() {
        let json = format_help(&sample_help(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["usage"][0], "app serve");
        assert_eq!(parsed["subcommands"][0]["subcommands"][0]["aliases"][0], "v");
    }

    #[test]
    fn test_output_formats() {
        assert_eq!(format_output(&Output::None, OutputFormat::Text).unwrap(), None);
        assert_eq!(
            format_output(&Output::from("hi"), OutputFormat::Json).unwrap(),
            Some("hi".to_string())
        );

        let list = Output::Value(Value::List(vec![Value::from("a"), Value::from("b")]));
        assert_eq!(
            format_output(&list, OutputFormat::Text).unwrap(),
            Some("a\nb".to_string())
        );
        assert_eq!(
            format_output(&list, OutputFormat::Yaml).unwrap(),
            Some("- a\n- b".to_string())
        );
    }
}
