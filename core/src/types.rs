//! Declaration types for command trees.
//!
//! A command tree is declared once by the embedding program and treated as
//! read-only input by the dispatch engine. Parsed values never live on these
//! types; they are collected per invocation in a [`Context`].
//!
//! The types are designed for serialization with [`serde`] so a tree can be
//! authored as JSON or YAML. Handlers and hooks are code and are skipped.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Context;

/// Error type returned by command handlers and after-parse hooks.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A parsed option or argument value.
///
/// Serialized untagged, so snapshots read as plain JSON scalars and arrays.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::Value;
///
/// let v = Value::from(vec!["a", "b"]);
/// assert_eq!(v.as_array(), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(Value::from(true).as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    String(String),
    Array(Vec<String>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::Array(value.into_iter().map(String::from).collect())
    }
}

/// Type of an option or positional argument, with its type-specific data.
///
/// Choices only exist on the string and array variants; a boolean cannot
/// carry a choice set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
    },
}

impl OptionKind {
    /// Lowercase type name as written in declaration files.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionKind::Boolean { .. } => "boolean",
            OptionKind::String { .. } => "string",
            OptionKind::Array { .. } => "array",
        }
    }
}

/// Declaration of a flag option or a positional argument.
///
/// Options and positional arguments share this shape. The option's
/// [`key`](OptionSpec::key) is what the parsed value is stored under.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{OptionSpec, Value};
///
/// let env = OptionSpec::string("env")
///     .with_short("e")
///     .with_choices(["dev", "staging"])
///     .with_default("dev");
/// assert!(env.matches("e"));
/// assert!(env.matches("env"));
/// assert_eq!(env.default_value(), Some(Value::from("dev")));
/// assert_eq!(env.choices(), ["dev", "staging"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Alternate result key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Exempts the value from choice validation.
    #[serde(default)]
    pub skip_validation: bool,
    #[serde(flatten)]
    pub kind: OptionKind,
}

impl OptionSpec {
    fn with_kind(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            short_name: None,
            question_name: None,
            description: None,
            required: false,
            skip_validation: false,
            kind,
        }
    }

    /// Creates a boolean option.
    pub fn boolean(name: &str) -> Self {
        Self::with_kind(name, OptionKind::Boolean { default: None })
    }

    /// Creates a string option.
    pub fn string(name: &str) -> Self {
        Self::with_kind(
            name,
            OptionKind::String {
                default: None,
                choices: Vec::new(),
            },
        )
    }

    /// Creates an array option; repeated occurrences accumulate.
    pub fn array(name: &str) -> Self {
        Self::with_kind(
            name,
            OptionKind::Array {
                default: None,
                choices: Vec::new(),
            },
        )
    }

    pub fn with_short(mut self, short: &str) -> Self {
        self.short_name = Some(short.to_string());
        self
    }

    pub fn with_question_name(mut self, key: &str) -> Self {
        self.question_name = Some(key.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn skip_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }

    /// Sets the default value.
    ///
    /// A default whose variant does not fit the option type is ignored, except
    /// that a single string is accepted as a one-element array default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        match (&mut self.kind, value.into()) {
            (OptionKind::Boolean { default }, Value::Bool(b)) => *default = Some(b),
            (OptionKind::String { default, .. }, Value::String(s)) => *default = Some(s),
            (OptionKind::Array { default, .. }, Value::Array(items)) => *default = Some(items),
            (OptionKind::Array { default, .. }, Value::String(s)) => *default = Some(vec![s]),
            _ => {}
        }
        self
    }

    /// Sets the allowed values. Has no effect on boolean options.
    pub fn with_choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match &mut self.kind {
            OptionKind::String { choices, .. } | OptionKind::Array { choices, .. } => {
                *choices = values.into_iter().map(Into::into).collect();
            }
            OptionKind::Boolean { .. } => {}
        }
        self
    }

    /// Key the parsed value is stored under: the question name if set,
    /// otherwise the name.
    pub fn key(&self) -> &str {
        self.question_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if `key` (already stripped of its dashes) names this
    /// option by name or short name.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.short_name.as_deref() == Some(key)
    }

    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            OptionKind::Boolean { default } => default.map(Value::Bool),
            OptionKind::String { default, .. } => default.clone().map(Value::String),
            OptionKind::Array { default, .. } => default.clone().map(Value::Array),
        }
    }

    /// Declared choice set; empty when unrestricted.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            OptionKind::String { choices, .. } | OptionKind::Array { choices, .. } => choices,
            OptionKind::Boolean { .. } => &[],
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, OptionKind::Boolean { .. })
    }
}

/// Command handler invoked with the populated [`Context`].
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&Context<'_>) -> Result<(), HandlerError> + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &Context<'_>) -> Result<(), HandlerError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Hook run after parsing and validation, before the handler. It may adjust
/// the context.
#[derive(Clone)]
pub struct AfterParseHook(Arc<dyn Fn(&mut Context<'_>) -> Result<(), HandlerError> + Send + Sync>);

impl AfterParseHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &mut Context<'_>) -> Result<(), HandlerError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for AfterParseHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AfterParseHook(..)")
    }
}

/// A node in the command tree.
///
/// The root node represents the program itself; its options are global and
/// apply to every command below it.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::{CommandNode, OptionSpec};
///
/// let root = CommandNode::new("app")
///     .with_option(OptionSpec::boolean("verbose").with_short("v"))
///     .with_subcommand(
///         CommandNode::new("build")
///             .with_alias("b")
///             .with_option(OptionSpec::string("target")),
///     );
///
/// assert_eq!(root.find_subcommand("b").unwrap().name, "build");
/// assert_eq!(root.subcommand_names(), vec!["build"]);
/// assert!(root.find_option("v").is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Program version; only read on the root node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub arguments: Vec<OptionSpec>,
    #[serde(default)]
    pub subcommands: Vec<CommandNode>,
    #[serde(skip)]
    pub execute: Option<Handler>,
    #[serde(skip)]
    pub after_parse: Option<AfterParseHook>,
}

impl CommandNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_argument(mut self, argument: OptionSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_subcommand(mut self, sub: CommandNode) -> Self {
        self.subcommands.push(sub);
        self
    }

    pub fn with_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.execute = Some(Handler::new(f));
        self
    }

    pub fn with_after_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.after_parse = Some(AfterParseHook::new(f));
        self
    }

    /// Finds a direct subcommand whose name or alias equals `token` exactly.
    pub fn find_subcommand(&self, token: &str) -> Option<&CommandNode> {
        self.subcommands
            .iter()
            .find(|s| s.name == token || s.aliases.iter().any(|a| a == token))
    }

    /// Finds an option of this node by name or short name.
    pub fn find_option(&self, key: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.matches(key))
    }

    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }
}
