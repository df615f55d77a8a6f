//! Multi-root resolution example.
//!
//! Builds a CLI from a built-in root and a plugin root whose subcommand
//! manifest is loaded from a YAML file, then shows how several token
//! vectors resolve and what help data the engine produces.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example multi_root
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use cmdtree_cli::{OutputFormat, format_help};
use cmdtree_core::{Command, CommandSchema, Output, ParamsDefinition, ValueType, command_fn};
use cmdtree_engine::{Cli, Outcome};
use cmdtree_registry::{CliConfig, Namespace, Root};

fn named(brief: &'static str) -> Arc<dyn Command> {
    let schema = CommandSchema::builder()
        .brief(brief)
        .params(ParamsDefinition::new("args", ValueType::String))
        .build()
        .expect("schema");
    command_fn(schema, move |call| {
        let args: Vec<String> = call
            .tail()
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        Ok(Output::from(format!("{brief} {args:?}")))
    })
}

fn main() {
    let dir = tempfile::tempdir().expect("temp dir");
    let manifest = dir.path().join("plugins.yaml");
    fs::write(
        &manifest,
        "subcommands:\n  - name: deploy\n    aliases: [ship]\n    brief: Deploy the current build\n  - name: debug\n    hidden: true\n",
    )
    .expect("write manifest");

    let builtin = Root::new(
        Namespace::new()
            .with_command("build", named("builtin build"))
            .with_command("deploy", named("builtin deploy"))
            .with_namespace("cache", Namespace::new().with_command("clear", named("clear cache"))),
    );

    let plugins = Root::new(
        Namespace::new()
            .with_command("deploy", named("plugin deploy"))
            .with_command("debug", named("plugin debug"))
            .with_namespace(
                "cache",
                Namespace::new().with_command("warm", named("warm cache")),
            )
            .with_manifest_file(&manifest),
    )
    .with_label("Plugins");

    let cli = Cli::builder("tool")
        .root(builtin)
        .root(plugins)
        .config(CliConfig::default())
        .build()
        .expect("tool CLI");

    for input in [
        &["build", "--release"][..],
        &["ship", "prod"][..],
        &["cache", "clear"][..],
        &["cache", "warm"][..],
        &["debug"][..],
        &["cache"][..],
        &["deplyo"][..],
    ] {
        let tokens: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        let resolution = cli.resolve(&tokens);
        println!(
            "{:<22} -> sequence {:?}, remaining {:?}, state {:?}",
            format!("{input:?}"),
            resolution.sequence,
            resolution.remaining,
            resolution.state
        );

        match cli.execute(&tokens, Path::new(".")) {
            Ok(Outcome::Output(output)) => println!("   output: {output:?}"),
            Ok(Outcome::Help { help, requested }) => {
                println!("   help (requested: {requested}): {}", help.usage_line());
            }
            Err(err) => println!("   error: {err}"),
        }
    }

    println!();
    println!("Top-level help as JSON:");
    match format_help(&cli.help(), OutputFormat::Json) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("{err}"),
    }
}
