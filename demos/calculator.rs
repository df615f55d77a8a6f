//! Calculator example.
//!
//! A single root with a namespace default, a variadic tail, validators and
//! a list castable, run through the process shim.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example calculator -- add 1 2 3
//! cargo run -p cmdtree-demos --example calculator -- div 1 0
//! cargo run -p cmdtree-demos --example calculator -- stats 4,8,15,16,23,42
//! cargo run -p cmdtree-demos --example calculator -- --help
//! ```

use cmdtree_cli::Shim;
use cmdtree_core::{
    Call, CommandError, CommandSchema, ListOf, Output, ParamDefinition, ParamsDefinition, Value,
    ValueType, command_fn, validation,
};
use cmdtree_engine::Cli;
use cmdtree_registry::{Namespace, Root, SubcommandDefinition};

fn numbers(call: &Call) -> Vec<f64> {
    call.tail()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_f64)
        .collect()
}

fn main() {
    let add = CommandSchema::builder()
        .brief("Add numbers")
        .params(ParamsDefinition::new("numbers", ValueType::Number).required())
        .build()
        .expect("add schema");

    let div = CommandSchema::builder()
        .brief("Divide two numbers")
        .param(ParamDefinition::required("dividend", ValueType::Number))
        .param(ParamDefinition::required("divisor", ValueType::Number))
        .build()
        .expect("div schema");

    let stats = CommandSchema::builder()
        .brief("Summarize a comma separated list of integers")
        .param(ParamDefinition::required(
            "values",
            ValueType::custom(
                ListOf::new(ValueType::Number).with_element_validator(validation::integer()),
            ),
        ))
        .build()
        .expect("stats schema");

    let usage = CommandSchema::builder()
        .description("A tiny calculator.")
        .build()
        .expect("default schema");

    let namespace = Namespace::new()
        .with_default(command_fn(usage, |_| Ok(Output::from("try `add 1 2`"))))
        .with_command(
            "add",
            command_fn(add, |call| {
                Ok(Output::Value(Value::Number(numbers(&call).iter().sum())))
            }),
        )
        .with_command(
            "div",
            command_fn(div, |call| {
                let a = call.positional(0).and_then(Value::as_f64).unwrap_or(0.0);
                let b = call.positional(1).and_then(Value::as_f64).unwrap_or(0.0);
                if b == 0.0 {
                    return Err(CommandError::with_code("Division by zero", 2));
                }
                Ok(Output::Value(Value::Number(a / b)))
            }),
        )
        .with_command(
            "stats",
            command_fn(stats, |call| {
                let values: Vec<f64> = call
                    .positional(0)
                    .and_then(Value::as_list)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(Value::as_f64)
                    .collect();
                let count = values.len();
                let mean = values.iter().sum::<f64>() / count.max(1) as f64;
                Ok(Output::Json(serde_json::json!({ "count": count, "mean": mean })))
            }),
        )
        .with_subcommand(SubcommandDefinition::new("add").with_alias("sum"))
        .with_subcommand(SubcommandDefinition::new("div").with_alias("divide"));

    let cli = Cli::builder("calculator")
        .root(Root::new(namespace))
        .build()
        .expect("calculator CLI");

    std::process::exit(Shim::new(cli).execute(std::env::args()));
}
