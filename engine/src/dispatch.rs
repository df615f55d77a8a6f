//! Invokes a resolved command with its bound arguments.

use cmdtree_core::{Call, CallArg, Command, CommandError, Output};
use tracing::debug;

use crate::binder::BoundArguments;

/// Builds the argument list in calling order: parameter values, the tail
/// as one list, the options object, then the context.
pub fn build_call(args: BoundArguments) -> Call {
    let mut call_args: Vec<CallArg> = args.positionals.into_iter().map(CallArg::Value).collect();

    if let Some(tail) = args.tail {
        call_args.push(CallArg::Tail(tail));
    }
    if let Some(options) = args.options {
        call_args.push(CallArg::Options(options));
    }
    if let Some(context) = args.context {
        call_args.push(CallArg::Context(context));
    }

    Call::new(call_args)
}

/// Calls `command` and returns its output unchanged.
pub fn dispatch(command: &dyn Command, args: BoundArguments) -> Result<Output, CommandError> {
    let call = build_call(args);
    debug!(args = call.args().len(), "Dispatching command");
    command.execute(call)
}

#[cfg(test)]
mod tests {
    use cmdtree_core::{BoundOptions, CommandSchema, Context, Value, command_fn};

    use super::*;

    #[test]
    fn test_calling_order() {
        let mut options = BoundOptions::new();
        options.insert("port", Value::Number(1.0));

        let call = build_call(BoundArguments {
            positionals: vec![Value::from("a"), Value::Null],
            tail: Some(vec![Value::Number(1.0)]),
            options: Some(options.clone()),
            context: Some(Context::default()),
        });

        assert_eq!(call.args().len(), 5);
        assert_eq!(call.positional(0), Some(&Value::from("a")));
        assert_eq!(call.positional(1), Some(&Value::Null));
        assert_eq!(call.tail(), Some(&[Value::Number(1.0)][..]));
        assert_eq!(call.options(), Some(&options));
        assert!(matches!(call.args()[4], CallArg::Context(_)));
    }

    #[test]
    fn test_absent_pieces_are_not_passed() {
        let call = build_call(BoundArguments {
            positionals: Vec::new(),
            tail: None,
            options: None,
            context: None,
        });
        assert!(call.args().is_empty());
    }

    #[test]
    fn test_output_is_returned_unchanged() {
        let schema = CommandSchema::builder().build().unwrap();
        let command = command_fn(schema, |call| {
            Ok(Output::from(format!("{} args", call.args().len())))
        });
        let args = BoundArguments {
            positionals: vec![Value::from("x")],
            tail: None,
            options: None,
            context: None,
        };
        assert_eq!(
            dispatch(command.as_ref(), args).unwrap(),
            Output::Text("1 args".to_string())
        );
    }
}
