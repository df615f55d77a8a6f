use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cmdtree_core::{
    CallArg, Command, CommandError, CommandSchema, OptionDefinition, Output, ParamDefinition,
    ParamsDefinition, Value, ValueType, command_fn,
};
use cmdtree_engine::{Cli, CliError, Outcome, UsageErrorKind};
use cmdtree_registry::{CliConfig, Namespace, Priority, Root, SubcommandDefinition};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokens(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// A command that echoes its call arguments as JSON.
fn echo(schema: CommandSchema) -> Arc<dyn Command> {
    command_fn(schema, |call| {
        let args: Vec<serde_json::Value> = call
            .into_args()
            .into_iter()
            .map(|arg| match arg {
                CallArg::Value(v) => serde_json::to_value(v),
                CallArg::Tail(items) => serde_json::to_value(items),
                CallArg::Options(options) => serde_json::to_value(options),
                CallArg::Context(context) => serde_json::to_value(context.commands),
            })
            .collect::<Result<_, _>>()
            .map_err(CommandError::other)?;
        Ok(Output::Json(serde_json::Value::Array(args)))
    })
}

fn labelled(text: &'static str) -> Arc<dyn Command> {
    let schema = CommandSchema::builder()
        .brief(text)
        .params(ParamsDefinition::new("rest", ValueType::String))
        .build()
        .unwrap();
    command_fn(schema, move |_| Ok(Output::from(text)))
}

fn run(cli: &Cli, parts: &[&str]) -> Result<Outcome, CliError> {
    cli.execute(&tokens(parts), Path::new("/work"))
}

fn output(cli: &Cli, parts: &[&str]) -> Output {
    match run(cli, parts) {
        Ok(Outcome::Output(output)) => output,
        other => panic!("expected output for {parts:?}, got {other:?}"),
    }
}

fn usage_error(cli: &Cli, parts: &[&str]) -> (String, UsageErrorKind) {
    match run(cli, parts) {
        Err(CliError::Usage(err)) => (err.to_string(), err.kind),
        other => panic!("expected usage error for {parts:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Default command with a required parameter
// ---------------------------------------------------------------------------

fn greeter() -> Cli {
    let schema = CommandSchema::builder()
        .param(ParamDefinition::required("name", ValueType::String))
        .build()
        .unwrap();
    Cli::builder("greet")
        .root(Root::new(Namespace::new().with_default(echo(schema))))
        .build()
        .unwrap()
}

#[test]
fn test_root_default_reports_missing_parameter() {
    let cli = greeter();
    let (message, kind) = usage_error(&cli, &[]);
    assert_eq!(message, "Expecting parameter(s) `name`");
    assert_eq!(kind, UsageErrorKind::MissingParams(vec!["name".to_string()]));
}

#[test]
fn test_root_default_binds_parameter() {
    let cli = greeter();
    assert_eq!(output(&cli, &["alice"]), Output::Json(json!(["alice"])));
}

#[test]
fn test_usage_error_carries_command_help() {
    let cli = greeter();
    match run(&cli, &[]) {
        Err(err) => {
            assert_eq!(err.exit_code(), 1);
            assert_eq!(err.help().unwrap().usage_line(), "greet <name>");
        }
        Ok(outcome) => panic!("unexpected {outcome:?}"),
    }
}

// ---------------------------------------------------------------------------
// Options and toggles
// ---------------------------------------------------------------------------

fn server() -> Cli {
    let schema = CommandSchema::builder()
        .option(OptionDefinition::new("port", ValueType::Number).with_default("5555"))
        .option(OptionDefinition::toggle("xxx").with_flag("x"))
        .build()
        .unwrap();
    Cli::builder("app")
        .root(Root::new(Namespace::new().with_command("serve", echo(schema))))
        .build()
        .unwrap()
}

#[test]
fn test_toggle_with_defaulted_option() {
    let cli = server();
    assert_eq!(
        output(&cli, &["serve", "-x"]),
        Output::Json(json!([{ "port": 5555.0, "xxx": true }]))
    );
}

#[test]
fn test_unknown_flag_runs_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let schema = CommandSchema::builder()
        .option(OptionDefinition::toggle("xxx").with_flag("x"))
        .build()
        .unwrap();
    let cli = Cli::builder("app")
        .root(Root::new(Namespace::new().with_command(
            "serve",
            command_fn(schema, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Output::None)
            }),
        )))
        .build()
        .unwrap();

    let (message, kind) = usage_error(&cli, &["serve", "-x", "-z"]);
    assert_eq!(message, "Unknown option flag \"z\"");
    assert_eq!(kind, UsageErrorKind::UnknownFlag('z'));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Variadic tail
// ---------------------------------------------------------------------------

fn summer() -> Cli {
    let schema = CommandSchema::builder()
        .param(ParamDefinition::required("x", ValueType::String))
        .params(ParamsDefinition::new("nums", ValueType::Number).required())
        .build()
        .unwrap();
    Cli::builder("app")
        .root(Root::new(Namespace::new().with_command("sum", echo(schema))))
        .build()
        .unwrap()
}

#[test]
fn test_required_tail_without_elements() {
    let (message, _) = usage_error(&summer(), &["sum", "x"]);
    assert!(message.starts_with("Expecting at least one element"));
}

#[test]
fn test_required_tail_binds_elements() {
    assert_eq!(
        output(&summer(), &["sum", "x", "1", "2"]),
        Output::Json(json!(["x", [1.0, 2.0]]))
    );
}

// ---------------------------------------------------------------------------
// Multiple roots
// ---------------------------------------------------------------------------

#[test]
fn test_higher_priority_root_wins_repeatedly() {
    // Last declared root has the highest priority by default.
    let cli = Cli::builder("app")
        .root(Root::new(Namespace::new().with_command("view", labelled("root B"))))
        .root(Root::new(Namespace::new().with_command("view", labelled("root A"))))
        .build()
        .unwrap();

    for _ in 0..20 {
        assert_eq!(output(&cli, &["view", "foo"]), Output::from("root A"));
    }
}

#[test]
fn test_first_declared_priority() {
    let config = CliConfig {
        priority: Priority::FirstDeclared,
        ..CliConfig::default()
    };
    let cli = Cli::builder("app")
        .config(config)
        .root(Root::new(Namespace::new().with_command("view", labelled("root A"))))
        .root(Root::new(Namespace::new().with_command("view", labelled("root B"))))
        .build()
        .unwrap();

    assert_eq!(output(&cli, &["view", "foo"]), Output::from("root A"));
}

#[test]
fn test_namespace_spread_across_roots() {
    let cli = Cli::builder("app")
        .root(Root::new(Namespace::new().with_namespace(
            "db",
            Namespace::new().with_command("migrate", labelled("migrate")),
        )))
        .root(Root::new(Namespace::new().with_namespace(
            "db",
            Namespace::new()
                .with_brief("Database tools")
                .with_command("seed", labelled("seed")),
        ))
        .with_label("Plugins"))
        .build()
        .unwrap();

    assert_eq!(output(&cli, &["db", "migrate"]), Output::from("migrate"));
    assert_eq!(output(&cli, &["db", "seed"]), Output::from("seed"));

    match run(&cli, &["db"]) {
        Ok(Outcome::Help { help, requested }) => {
            assert!(!requested);
            assert_eq!(help.sequence, vec!["app", "db"]);
            let labels: Vec<&str> = help.subcommands.iter().map(|g| g.label.as_str()).collect();
            assert_eq!(labels, vec!["Subcommands", "Plugins"]);
        }
        other => panic!("expected help, got {other:?}"),
    }
}

#[test]
fn test_alias_resolves_to_canonical_name() {
    let cli = Cli::builder("app")
        .root(Root::new(
            Namespace::new()
                .with_command("status", labelled("status"))
                .with_subcommand(SubcommandDefinition::new("status").with_alias("st")),
        ))
        .build()
        .unwrap();

    let resolution = cli.resolve(&tokens(&["st", "-v"]));
    assert_eq!(resolution.sequence, vec!["app", "status"]);
    assert_eq!(resolution.remaining, vec!["-v"]);
    assert_eq!(output(&cli, &["st"]), Output::from("status"));
}

#[test]
fn test_alias_and_name_pick_the_same_root() {
    let cli = Cli::builder("app")
        .root(Root::new(
            Namespace::new()
                .with_command("view", labelled("core view"))
                .with_subcommand(SubcommandDefinition::new("view").with_alias("v")),
        ))
        .root(
            Root::new(Namespace::new().with_command("view", labelled("ext view")))
                .with_label("Extensions"),
        )
        .build()
        .unwrap();

    assert_eq!(output(&cli, &["view"]), Output::from("ext view"));
    assert_eq!(output(&cli, &["v"]), output(&cli, &["view"]));
    assert_eq!(cli.resolve(&tokens(&["v"])).sequence, vec!["app", "view"]);
}

#[test]
fn test_conflicting_aliases_fail_to_build() {
    let result = Cli::builder("app")
        .root(Root::new(
            Namespace::new()
                .with_subcommand(SubcommandDefinition::new("build").with_alias("b"))
                .with_subcommand(SubcommandDefinition::new("bench").with_alias("b")),
        ))
        .build();
    assert!(matches!(result, Err(CliError::Config(_))));
}

// ---------------------------------------------------------------------------
// Help outcomes and unknown subcommands
// ---------------------------------------------------------------------------

#[test]
fn test_explicit_help_is_requested() {
    let cli = server();
    for flag in ["-h", "-?", "--help"] {
        match run(&cli, &["serve", flag]) {
            Ok(Outcome::Help { help, requested }) => {
                assert!(requested);
                assert_eq!(help.usage_line(), "app serve [...options]");
            }
            other => panic!("expected help for {flag}, got {other:?}"),
        }
    }

    match run(&cli, &["--help"]) {
        Ok(Outcome::Help { requested, .. }) => assert!(requested),
        other => panic!("expected help, got {other:?}"),
    }
}

#[test]
fn test_unknown_subcommand_is_a_usage_error() {
    let (message, _) = usage_error(&server(), &["serv"]);
    assert_eq!(message, "Unknown subcommand \"serv\", did you mean `serve`?");
}

#[test]
fn test_unknown_token_goes_to_namespace_default() {
    let schema = CommandSchema::builder()
        .param(ParamDefinition::optional("target", ValueType::String))
        .build()
        .unwrap();
    let cli = Cli::builder("app")
        .root(Root::new(
            Namespace::new()
                .with_default(echo(schema))
                .with_command("serve", labelled("serve")),
        ))
        .build()
        .unwrap();

    assert_eq!(output(&cli, &["elsewhere"]), Output::Json(json!(["elsewhere"])));
    assert_eq!(output(&cli, &["serve"]), Output::from("serve"));
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

#[test]
fn test_context_hook_and_sequence() {
    let schema = CommandSchema::builder().context().build().unwrap();
    let show = command_fn(schema, |call| {
        let context = call.context().ok_or_else(|| CommandError::expected("no context"))?;
        let user = context
            .extension("user")
            .and_then(Value::as_str)
            .unwrap_or("nobody")
            .to_string();
        Ok(Output::from(format!(
            "{} {} {}",
            context.commands.join("/"),
            context.cwd.display(),
            user
        )))
    });

    let cli = Cli::builder("app")
        .root(Root::new(Namespace::new().with_namespace(
            "who",
            Namespace::new().with_command("ami", show),
        )))
        .context_hook(|ctx| {
            ctx.extensions.insert("user".to_string(), Value::from("root"));
        })
        .build()
        .unwrap();

    assert_eq!(output(&cli, &["who", "ami"]), Output::from("app/who/ami /work root"));
}

#[test]
fn test_command_errors_pass_through() {
    let schema = CommandSchema::builder().build().unwrap();
    let fail = command_fn(schema, |_| Err(CommandError::with_code("nope", 3)));
    let cli = Cli::builder("app")
        .root(Root::new(Namespace::new().with_command("fail", fail)))
        .build()
        .unwrap();

    match run(&cli, &["fail"]) {
        Err(err @ CliError::Command(_)) => {
            assert_eq!(err.exit_code(), 3);
            assert_eq!(err.to_string(), "nope");
        }
        other => panic!("expected command error, got {other:?}"),
    }
}
