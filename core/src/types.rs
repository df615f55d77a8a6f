//! Command schema definitions.
//!
//! A [`CommandSchema`] describes what a command accepts: ordered positional
//! parameters ([`ParamDefinition`]), at most one variadic tail
//! ([`ParamsDefinition`]), named options ([`OptionDefinition`]) and whether
//! the invocation [`Context`](crate::Context) should be injected.
//!
//! Schemas are built through [`CommandSchemaBuilder`] and validated when
//! built, so a `CommandSchema` value is always well formed.

use crate::cast::{Validator, ValueType};
use crate::validate::{ConfigError, validate_schema};
use crate::value::{DefaultValue, Value};

/// A positional parameter.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ParamDefinition, ValueType};
///
/// let name = ParamDefinition::required("name", ValueType::String)
///     .with_description("Who to greet");
/// assert!(name.required);
///
/// let count = ParamDefinition::optional("count", ValueType::Number).with_default("1");
/// assert!(!count.required);
/// assert!(count.default.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ParamDefinition {
    /// Name shown in usage and error text.
    pub name: String,
    pub value_type: ValueType,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub validators: Vec<Validator>,
    pub description: Option<String>,
    /// 0-based position; assigned in declaration order unless set explicitly.
    pub position: Option<usize>,
}

impl ParamDefinition {
    pub fn required(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            required: true,
            default: None,
            validators: Vec::new(),
            description: None,
            position: None,
        }
    }

    pub fn optional(name: &str, value_type: ValueType) -> Self {
        Self {
            required: false,
            ..Self::required(name, value_type)
        }
    }

    /// Sets a string default, cast like a user-supplied token.
    pub fn with_default(mut self, raw: &str) -> Self {
        self.default = Some(DefaultValue::Raw(raw.to_string()));
        self
    }

    /// Sets a default used without casting.
    pub fn with_literal_default(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Literal(value));
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Pins the parameter to an explicit position.
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn index(&self) -> usize {
        self.position.unwrap_or_default()
    }
}

/// The variadic tail collecting all remaining positional tokens.
///
/// `required` means at least one element must be supplied.
#[derive(Debug, Clone)]
pub struct ParamsDefinition {
    pub name: String,
    /// Type of every element.
    pub value_type: ValueType,
    pub required: bool,
    pub validators: Vec<Validator>,
    pub description: Option<String>,
    pub position: Option<usize>,
}

impl ParamsDefinition {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            required: false,
            validators: Vec::new(),
            description: None,
            position: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// A named option or toggle.
///
/// The long name defaults to the kebab-case form of `key`; bound values are
/// stored under `key`.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{OptionDefinition, ValueType};
///
/// let port = OptionDefinition::new("port", ValueType::Number).with_default("5555");
/// assert_eq!(port.name, "port");
/// assert!(!port.toggle);
///
/// let dry_run = OptionDefinition::toggle("dryRun").with_flag("n");
/// assert_eq!(dry_run.name, "dry-run");
/// assert_eq!(dry_run.flag.as_deref(), Some("n"));
/// ```
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    /// Key under which the bound value is stored.
    pub key: String,
    /// Long name, used as `--name`.
    pub name: String,
    /// Single-character flag, used as `-x`.
    pub flag: Option<String>,
    pub value_type: ValueType,
    /// Boolean switch that takes no value.
    pub toggle: bool,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub validators: Vec<Validator>,
    /// Placeholder shown in help, e.g. `--port <number>`.
    pub placeholder: Option<String>,
    pub description: Option<String>,
}

impl OptionDefinition {
    pub fn new(key: &str, value_type: ValueType) -> Self {
        Self {
            key: key.to_string(),
            name: hyphenate(key),
            flag: None,
            value_type,
            toggle: false,
            required: false,
            default: None,
            validators: Vec::new(),
            placeholder: None,
            description: None,
        }
    }

    pub fn toggle(key: &str) -> Self {
        Self {
            toggle: true,
            ..Self::new(key, ValueType::Bool)
        }
    }

    /// Overrides the derived long name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flag = Some(flag.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, raw: &str) -> Self {
        self.default = Some(DefaultValue::Raw(raw.to_string()));
        self
    }

    pub fn with_literal_default(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Literal(value));
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Placeholder text, falling back to the key.
    pub fn placeholder_text(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(&self.key)
    }
}

/// A validated command schema.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let schema = CommandSchema::builder()
///     .brief("Serve files")
///     .param(ParamDefinition::required("root", ValueType::String))
///     .param(ParamDefinition::optional("host", ValueType::String).with_default("localhost"))
///     .option(OptionDefinition::new("port", ValueType::Number).with_default("5555"))
///     .option(OptionDefinition::toggle("xxx").with_flag("x"))
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.required_params(), 1);
/// assert!(schema.has_options());
/// assert!(schema.find_option_by_flag("x").is_some());
///
/// // Required parameters cannot follow optional ones.
/// let bad = CommandSchema::builder()
///     .param(ParamDefinition::optional("a", ValueType::String))
///     .param(ParamDefinition::required("b", ValueType::String))
///     .build();
/// assert!(bad.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSchema {
    brief: Option<String>,
    description: Option<String>,
    params: Vec<ParamDefinition>,
    tail: Option<ParamsDefinition>,
    options: Vec<OptionDefinition>,
    wants_context: bool,
    required_params: usize,
}

impl CommandSchema {
    pub fn builder() -> CommandSchemaBuilder {
        CommandSchemaBuilder::default()
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Brief text, falling back to the description.
    pub fn summary(&self) -> Option<&str> {
        self.brief().or(self.description())
    }

    /// Positional parameters ordered by position.
    pub fn params(&self) -> &[ParamDefinition] {
        &self.params
    }

    pub fn tail(&self) -> Option<&ParamsDefinition> {
        self.tail.as_ref()
    }

    pub fn options(&self) -> &[OptionDefinition] {
        &self.options
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn wants_context(&self) -> bool {
        self.wants_context
    }

    /// Number of leading required positional parameters.
    pub fn required_params(&self) -> usize {
        self.required_params
    }

    pub fn find_option(&self, name: &str) -> Option<&OptionDefinition> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn find_option_by_flag(&self, flag: &str) -> Option<&OptionDefinition> {
        self.options.iter().find(|o| o.flag.as_deref() == Some(flag))
    }
}

/// Builder for [`CommandSchema`].
#[derive(Debug, Clone, Default)]
pub struct CommandSchemaBuilder {
    schema: CommandSchema,
}

impl CommandSchemaBuilder {
    pub fn brief(mut self, brief: &str) -> Self {
        self.schema.brief = Some(brief.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.schema.description = Some(description.to_string());
        self
    }

    pub fn param(mut self, param: ParamDefinition) -> Self {
        self.schema.params.push(param);
        self
    }

    /// Declares the variadic tail. Declaring it twice keeps the last one.
    pub fn params(mut self, tail: ParamsDefinition) -> Self {
        self.schema.tail = Some(tail);
        self
    }

    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.schema.options.push(option);
        self
    }

    /// Requests the invocation context.
    pub fn context(mut self) -> Self {
        self.schema.wants_context = true;
        self
    }

    /// Assigns positions, validates, and computes the required count.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn build(self) -> Result<CommandSchema, ConfigError> {
        let mut schema = self.schema;

        for (index, param) in schema.params.iter_mut().enumerate() {
            param.position.get_or_insert(index);
        }
        schema.params.sort_by_key(|p| p.index());

        let param_count = schema.params.len();
        if let Some(tail) = schema.tail.as_mut() {
            tail.position.get_or_insert(param_count);
        }

        validate_schema(&schema)?;

        schema.required_params = schema.params.iter().take_while(|p| p.required).count();
        Ok(schema)
    }
}

/// Converts `camelCase` or `snake_case` keys to `kebab-case`.
///
/// A run of capitals is one word; its last capital starts a new word when
/// followed by a lowercase letter.
///
/// # Examples
///
/// ```
/// use cmdtree_core::hyphenate;
///
/// assert_eq!(hyphenate("dryRun"), "dry-run");
/// assert_eq!(hyphenate("dry_run"), "dry-run");
/// assert_eq!(hyphenate("baseURL"), "base-url");
/// assert_eq!(hyphenate("port"), "port");
/// ```
pub fn hyphenate(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            out.push('-');
            continue;
        }
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1);
        let starts_word = match prev {
            None | Some('_') => false,
            Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
            Some(_) => true,
        };
        if starts_word {
            out.push('-');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
