//! Per-invocation parse results.
//!
//! A [`Context`] is created fresh for every dispatch and discarded once the
//! handler returns. It borrows the declaration tree and owns every parsed
//! value, so two dispatches over the same tree never observe each other.

use std::collections::BTreeMap;

use serde_json::json;

use crate::{CommandNode, OptionSpec, Value};

/// A resolved command together with the path that reached it.
#[derive(Debug, Clone)]
pub struct FoundCommand<'a> {
    /// The resolved node.
    pub node: &'a CommandNode,
    /// Root of the tree the node was resolved from.
    pub root: &'a CommandNode,
    /// Space-joined root name and consumed tokens (e.g. `"app remote add"`).
    pub full_name: String,
    /// Tokens consumed while walking down from the root.
    pub path: Vec<String>,
}

impl<'a> FoundCommand<'a> {
    pub fn new(root: &'a CommandNode) -> Self {
        Self {
            node: root,
            root,
            full_name: root.name.clone(),
            path: Vec::new(),
        }
    }

    /// Returns `true` when no subcommand token was consumed.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Root options that apply as globals; empty when the resolved command is
    /// the root itself.
    pub fn global_options(&self) -> &'a [OptionSpec] {
        if self.is_root() {
            &[]
        } else {
            &self.root.options
        }
    }

    pub fn local_options(&self) -> &'a [OptionSpec] {
        &self.node.options
    }
}

/// Parsed state handed to the command handler.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub command: FoundCommand<'a>,
    /// Command-scoped option values, keyed by [`OptionSpec::key`].
    pub option_values: BTreeMap<String, Value>,
    /// Root option values when the resolved command is not the root.
    pub global_option_values: BTreeMap<String, Value>,
    /// Positional values, index-aligned with the declared arguments.
    pub argument_values: Vec<Option<Value>>,
    pub telemetry_properties: BTreeMap<String, String>,
}

impl<'a> Context<'a> {
    pub fn new(command: FoundCommand<'a>) -> Self {
        let slots = command.node.arguments.len();
        Self {
            command,
            option_values: BTreeMap::new(),
            global_option_values: BTreeMap::new(),
            argument_values: vec![None; slots],
            telemetry_properties: BTreeMap::new(),
        }
    }

    /// Looks up an option value, command scope first, then global scope.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.option_values
            .get(key)
            .or_else(|| self.global_option_values.get(key))
    }

    /// Boolean option value; `false` when unset or not a boolean.
    pub fn flag(&self, key: &str) -> bool {
        self.value(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    pub fn array(&self, key: &str) -> Option<&[String]> {
        self.value(key).and_then(Value::as_array)
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.argument_values.get(index).and_then(Option::as_ref)
    }

    /// Positional value by declared argument key.
    pub fn argument_named(&self, key: &str) -> Option<&Value> {
        let index = self
            .command
            .node
            .arguments
            .iter()
            .position(|a| a.key() == key)?;
        self.argument(index)
    }

    /// JSON snapshot of the parsed state, used for tracing and CLI output.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "command": self.command.full_name,
            "options": self.option_values,
            "globalOptions": self.global_option_values,
            "arguments": self.argument_values,
            "telemetry": self.telemetry_properties,
        })
    }
}
