//! Argument binding.
//!
//! Consumes the tokens left over by the resolver against a command schema:
//! options and flag clusters, positional parameters, then the variadic
//! tail. Every raw string goes through the casting contract one at a time,
//! in token order, so the first failure is always the one reported.
//!
//! After the tokens are consumed the checks run in a fixed order: missing
//! positional parameters, missing required options, parameter defaults,
//! option defaults, then the required tail.

use std::collections::HashSet;
use std::sync::LazyLock;

use cmdtree_core::{
    BoundOptions, CastingContext, CommandSchema, Context, DefaultValue, OptionDefinition, Value,
    ValueType, Validator, cast,
};
use regex::Regex;
use tracing::trace;

use crate::error::UsageErrorKind;

/// Negative number literals, which are values rather than flags.
static NEGATIVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("static regex must compile")
});

/// Fully bound arguments of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    /// One value per declared parameter; `Value::Null` when absent.
    pub positionals: Vec<Value>,
    /// Present iff the schema declares a variadic tail.
    pub tail: Option<Vec<Value>>,
    /// Present iff the schema declares any option.
    pub options: Option<BoundOptions>,
    /// Present iff the schema requests the context.
    pub context: Option<Context>,
}

/// Outcome of binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Bound(BoundArguments),
    /// A help token was found; nothing was bound.
    Help,
}

/// Whether a token is an option or flag token.
pub fn is_option_like(token: &str) -> bool {
    token.starts_with('-') && token != "-" && !NEGATIVE_NUMBER_RE.is_match(token)
}

/// Binds tokens against one schema.
pub struct Binder<'a> {
    schema: &'a CommandSchema,
}

struct State<'s, 't> {
    tokens: std::slice::Iter<'t, String>,
    context: &'t Context,
    positionals: Vec<Value>,
    tail: Vec<Value>,
    options: BoundOptions,
    seen: HashSet<&'s str>,
}

impl<'a> Binder<'a> {
    pub fn new(schema: &'a CommandSchema) -> Self {
        Self { schema }
    }

    /// Whether `token` requests help for this command.
    ///
    /// `-?` always does; `-h` and `--help` only when the command does not
    /// declare a flag `h` or an option named `help` itself.
    pub fn is_help_token(&self, token: &str) -> bool {
        match token {
            "-?" => true,
            "-h" => self.schema.find_option_by_flag("h").is_none(),
            "--help" => self.schema.find_option("help").is_none(),
            _ => false,
        }
    }

    /// Binds `tokens`. `context` supplies the cwd and command sequence to
    /// castables and is handed to the command if it asked for it.
    ///
    /// # Errors
    ///
    /// Returns the first usage error: unknown options or flags, missing or
    /// misplaced option values, surplus arguments, cast or validator
    /// failures, missing parameters or options, or an empty required tail.
    pub fn bind(&self, tokens: &[String], context: &Context) -> Result<Binding, UsageErrorKind> {
        let mut state = State {
            tokens: tokens.iter(),
            context,
            positionals: Vec::with_capacity(self.schema.params().len()),
            tail: Vec::new(),
            options: BoundOptions::new(),
            seen: HashSet::new(),
        };
        let mut options_ended = false;

        while let Some(token) = state.tokens.next() {
            if !options_ended {
                if self.is_help_token(token) {
                    trace!(token = %token, "Help requested");
                    return Ok(Binding::Help);
                }

                if token == "--" {
                    options_ended = true;
                    continue;
                }

                if is_option_like(token) {
                    match token.strip_prefix("--") {
                        Some(long) => self.consume_long(long, &mut state)?,
                        None => self.consume_flags(&token[1..], &mut state)?,
                    }
                    continue;
                }
            }

            self.consume_positional(token, &mut state)?;
        }

        let filled = state.positionals.len();
        let required = self.schema.required_params();
        if filled < required {
            let missing = self.schema.params()[filled..required]
                .iter()
                .map(|p| p.name.clone())
                .collect();
            return Err(UsageErrorKind::MissingParams(missing));
        }

        let missing_options: Vec<String> = self
            .schema
            .options()
            .iter()
            .filter(|o| o.required && !state.seen.contains(o.key.as_str()))
            .map(|o| o.name.clone())
            .collect();
        if !missing_options.is_empty() {
            return Err(UsageErrorKind::MissingOptions(missing_options));
        }

        for param in &self.schema.params()[filled..] {
            let value = match &param.default {
                Some(default) => self.cast_default(
                    default,
                    &param.name,
                    &param.value_type,
                    &param.validators,
                    context,
                )?,
                None => Value::Null,
            };
            state.positionals.push(value);
        }

        for option in self.schema.options() {
            if state.options.contains(&option.key) {
                continue;
            }
            match &option.default {
                Some(default) => {
                    let value = self.cast_default(
                        default,
                        &option.name,
                        &option.value_type,
                        &option.validators,
                        context,
                    )?;
                    state.options.insert(&option.key, value);
                }
                None if option.toggle => state.options.insert(&option.key, Value::Bool(false)),
                None => {}
            }
        }

        let tail = match self.schema.tail() {
            Some(def) if def.required && state.tail.is_empty() => {
                return Err(UsageErrorKind::EmptyTail(def.name.clone()));
            }
            Some(_) => Some(state.tail),
            None => None,
        };

        Ok(Binding::Bound(BoundArguments {
            positionals: state.positionals,
            tail,
            options: self.schema.has_options().then_some(state.options),
            context: self.schema.wants_context().then(|| context.clone()),
        }))
    }

    fn consume_positional(
        &self,
        token: &str,
        state: &mut State<'a, '_>,
    ) -> Result<(), UsageErrorKind> {
        let index = state.positionals.len();

        if let Some(param) = self.schema.params().get(index) {
            trace!(param = %param.name, token = %token, "Binding parameter");
            let value = cast_token(
                token,
                &param.name,
                &param.value_type,
                &param.validators,
                false,
                state.context,
            )?;
            state.positionals.push(value);
            return Ok(());
        }

        if let Some(tail) = self.schema.tail() {
            trace!(params = %tail.name, token = %token, "Binding variadic element");
            let value = cast_token(
                token,
                &tail.name,
                &tail.value_type,
                &tail.validators,
                false,
                state.context,
            )?;
            state.tail.push(value);
            return Ok(());
        }

        Err(UsageErrorKind::TooManyArguments {
            expected: self.schema.params().len(),
            token: token.to_string(),
        })
    }

    /// `--name` or `--name=value`.
    fn consume_long(
        &self,
        long: &str,
        state: &mut State<'a, '_>,
    ) -> Result<(), UsageErrorKind> {
        let (name, inline) = match long.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (long, None),
        };

        let option = self
            .schema
            .find_option(name)
            .ok_or_else(|| UsageErrorKind::UnknownOption(name.to_string()))?;

        match inline {
            Some(raw) => {
                let value = cast_token(
                    raw,
                    &option.name,
                    &option.value_type,
                    &option.validators,
                    false,
                    state.context,
                )?;
                self.record(option, value, state);
                Ok(())
            }
            None => self.consume_option(option, state),
        }
    }

    /// `-xyz`: every flag but the last must be a toggle.
    fn consume_flags(
        &self,
        flags: &str,
        state: &mut State<'a, '_>,
    ) -> Result<(), UsageErrorKind> {
        let count = flags.chars().count();

        for (i, flag) in flags.chars().enumerate() {
            let mut buf = [0u8; 4];
            let option = self
                .schema
                .find_option_by_flag(flag.encode_utf8(&mut buf))
                .ok_or(UsageErrorKind::UnknownFlag(flag))?;

            if !option.toggle && i + 1 != count {
                return Err(UsageErrorKind::ValueFlagNotLast);
            }
            self.consume_option(option, state)?;
        }

        Ok(())
    }

    /// Sets a toggle, or consumes the next token as the option's value.
    fn consume_option(
        &self,
        option: &'a OptionDefinition,
        state: &mut State<'a, '_>,
    ) -> Result<(), UsageErrorKind> {
        if option.toggle {
            self.record(option, Value::Bool(true), state);
            return Ok(());
        }

        let raw = state
            .tokens
            .next()
            .ok_or_else(|| UsageErrorKind::MissingOptionValue(option.name.clone()))?;
        if is_option_like(raw) {
            return Err(UsageErrorKind::OptionAsValue {
                token: raw.clone(),
                option: option.name.clone(),
            });
        }

        let value = cast_token(
            raw,
            &option.name,
            &option.value_type,
            &option.validators,
            false,
            state.context,
        )?;
        self.record(option, value, state);
        Ok(())
    }

    fn record(&self, option: &'a OptionDefinition, value: Value, state: &mut State<'a, '_>) {
        trace!(option = %option.name, value = %value, "Binding option");
        state.seen.insert(option.key.as_str());
        state.options.insert(&option.key, value);
    }

    fn cast_default(
        &self,
        default: &DefaultValue,
        name: &str,
        value_type: &ValueType,
        validators: &[Validator],
        context: &Context,
    ) -> Result<Value, UsageErrorKind> {
        match default {
            DefaultValue::Raw(raw) => cast_token(raw, name, value_type, validators, true, context),
            DefaultValue::Literal(value) => Ok(value.clone()),
        }
    }
}

fn cast_token(
    raw: &str,
    name: &str,
    value_type: &ValueType,
    validators: &[Validator],
    default: bool,
    context: &Context,
) -> Result<Value, UsageErrorKind> {
    let ctx = CastingContext::new(name, raw, validators, default, &context.cwd, &context.commands);
    Ok(cast(raw, value_type, &ctx)?)
}
