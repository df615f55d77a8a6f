//! The command tree behind `tree-demo`.
//!
//! Two roots: the core commands, and a "Plugins" root declared last so it
//! overrides `version`.

use std::fs;

use cmdtree_core::{
    Call, CommandError, CommandSchema, ConfigError, DirPath, ListOf, OptionDefinition, Output,
    ParamDefinition, ParamsDefinition, Timestamp, Value, ValueType, command_fn, validation,
};
use cmdtree_registry::{Namespace, Root, SubcommandDefinition};

pub fn core_root() -> Result<Root, ConfigError> {
    let greet = CommandSchema::builder()
        .brief("Greet someone")
        .param(ParamDefinition::required("name", ValueType::String).with_description("Who to greet"))
        .option(
            OptionDefinition::new("times", ValueType::Number)
                .with_flag("t")
                .with_default("1")
                .with_validator(validation::integer())
                .with_validator(validation::range(1.0, 11.0))
                .with_description("Repetitions"),
        )
        .option(OptionDefinition::toggle("shout").with_flag("s").with_description("Upper-case the greeting"))
        .build()?;

    let add = CommandSchema::builder()
        .brief("Add numbers")
        .params(ParamsDefinition::new("numbers", ValueType::Number).required())
        .build()?;

    let ls = CommandSchema::builder()
        .brief("List a directory")
        .param(ParamDefinition::optional("dir", ValueType::custom(DirPath)).with_default("."))
        .build()?;

    let when = CommandSchema::builder()
        .brief("Parse a date or timestamp")
        .param(ParamDefinition::required("date", ValueType::custom(Timestamp)))
        .build()?;

    let tags = CommandSchema::builder()
        .brief("Split comma separated tags")
        .param(ParamDefinition::required("tags", ValueType::custom(ListOf::new(ValueType::String))))
        .build()?;

    let env = CommandSchema::builder()
        .brief("Show the invocation context")
        .context()
        .build()?;

    let version = CommandSchema::builder().brief("Show the version").build()?;

    let ping = CommandSchema::builder()
        .brief("Pretend to ping a host")
        .param(ParamDefinition::required("host", ValueType::String).with_validator(validation::ip()))
        .build()?;

    let namespace = Namespace::new()
        .with_description("Demonstration of a multi-root command tree.")
        .with_command("greet", command_fn(greet, run_greet))
        .with_command("add", command_fn(add, run_add))
        .with_command("ls", command_fn(ls, run_ls))
        .with_command("when", command_fn(when, |call| Ok(first(&call).into())))
        .with_command("tags", command_fn(tags, |call| Ok(first(&call).into())))
        .with_command("env", command_fn(env, run_env))
        .with_command("version", command_fn(version, |_| Ok(Output::from("tree-demo core"))))
        .with_namespace(
            "net",
            Namespace::new()
                .with_brief("Network helpers")
                .with_command(
                    "ping",
                    command_fn(ping, |call| Ok(Output::from(format!("pong from {}", first(&call))))),
                ),
        )
        .with_subcommand(SubcommandDefinition::new("greet").with_alias("hi"))
        .with_subcommand(SubcommandDefinition::new("add").with_alias("sum"))
        .with_subcommand(SubcommandDefinition::new("env").hidden());

    Ok(Root::new(namespace))
}

pub fn plugin_root() -> Result<Root, ConfigError> {
    let version = CommandSchema::builder()
        .brief("Show the version, including plugins")
        .build()?;

    let stats = CommandSchema::builder().description("Text statistics.").build()?;

    let count = CommandSchema::builder()
        .brief("Count words")
        .params(ParamsDefinition::new("words", ValueType::String))
        .build()?;

    let namespace = Namespace::new()
        .with_command("version", command_fn(version, |_| Ok(Output::from("tree-demo plugins"))))
        .with_namespace(
            "stats",
            Namespace::new()
                .with_brief("Text statistics")
                .with_default(command_fn(stats, |_| Ok(Output::from("try `stats count`"))))
                .with_command(
                    "count",
                    command_fn(count, |call| {
                        let n = call.tail().map_or(0, <[Value]>::len);
                        Ok(Output::Value(Value::Number(n as f64)))
                    }),
                ),
        );

    Ok(Root::new(namespace).with_label("Plugins"))
}

fn first(call: &Call) -> Value {
    call.positional(0).cloned().unwrap_or(Value::Null)
}

fn run_greet(call: Call) -> Result<Output, CommandError> {
    let name = first(&call).to_string();
    let options = call
        .options()
        .ok_or_else(|| CommandError::expected("greet expects options"))?;

    let mut line = format!("Hello, {name}!");
    if options.flag("shout") {
        line = line.to_uppercase();
    }

    let times = options.number("times").unwrap_or(1.0) as usize;
    Ok(Output::from(vec![line; times].join("\n")))
}

fn run_add(call: Call) -> Result<Output, CommandError> {
    let sum: f64 = call.tail().unwrap_or_default().iter().filter_map(Value::as_f64).sum();
    Ok(Output::Value(Value::Number(sum)))
}

fn run_ls(call: Call) -> Result<Output, CommandError> {
    let dir = first(&call);
    let path = dir
        .as_path()
        .ok_or_else(|| CommandError::expected("Expecting a directory"))?;
    path.assert(true)?;

    let mut names: Vec<String> = fs::read_dir(&path.full_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    Ok(Output::Value(Value::List(names.into_iter().map(Value::String).collect())))
}

fn run_env(call: Call) -> Result<Output, CommandError> {
    let context = call
        .context()
        .ok_or_else(|| CommandError::expected("env expects a context"))?;
    let json = serde_json::to_value(context).map_err(CommandError::other)?;
    Ok(Output::Json(json))
}
