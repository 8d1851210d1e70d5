//! Token parsing against a resolved command.
//!
//! The parser consumes the tokens left over after resolution and fills a
//! [`ParsedValues`] keyed by option identity. Declarations are only read;
//! nothing parsed is ever written back into the command tree.
//!
//! Tokenization rules:
//!
//! - `--key` and `-key` are flags; the prefix is stripped and the key is
//!   looked up by name or short name among the local and global options.
//! - `--key=value` is split on the first `=` and the value is pushed back as
//!   the next token, so it goes through the same look-ahead as `--key value`.
//! - Booleans consume a following `true`/`false` (any case) and otherwise
//!   default to `true`.
//! - Strings and arrays consume the next token unless it names a known flag.
//!   Array values are split on `,` and accumulate across occurrences.
//! - A bare `--` ends flag processing. A bare `-` is positional.
//! - Other tokens fill positional slots in declaration order.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use command_dispatch_core::{Context, FoundCommand, OptionKind, OptionSpec, Value};

use crate::distance::suggest;
use crate::error::{DispatchError, Result};
use crate::logger::Logger;

/// Which option list of the resolved scope an option came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionScope {
    /// Declared on the root while a subcommand is resolved.
    Global,
    /// Declared on the resolved command itself.
    Local,
}

/// Identity of an option within a resolved scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId {
    pub scope: OptionScope,
    pub index: usize,
}

/// Lookup table over every option that applies to a resolved command.
///
/// A global option with the same name as a local option is shadowed: it is
/// left out of the table under its name and its short name alike.
#[derive(Debug)]
pub struct OptionTable<'a> {
    global: &'a [OptionSpec],
    local: &'a [OptionSpec],
    lookup: HashMap<&'a str, OptionId>,
}

impl<'a> OptionTable<'a> {
    pub fn new(command: &FoundCommand<'a>) -> Self {
        let global = command.global_options();
        let local = command.local_options();
        let mut lookup = HashMap::new();

        let scoped = global
            .iter()
            .enumerate()
            .filter(|(_, spec)| !is_shadowed(local, spec))
            .map(|(index, spec)| (OptionScope::Global, index, spec))
            .chain(
                local
                    .iter()
                    .enumerate()
                    .map(|(index, spec)| (OptionScope::Local, index, spec)),
            );
        for (scope, index, spec) in scoped {
            let id = OptionId { scope, index };
            lookup.insert(spec.name.as_str(), id);
            if let Some(short) = spec.short_name.as_deref() {
                lookup.insert(short, id);
            }
        }

        Self {
            global,
            local,
            lookup,
        }
    }

    /// Resolves a stripped flag key by name or short name.
    pub fn resolve(&self, key: &str) -> Option<OptionId> {
        self.lookup.get(key).copied()
    }

    pub fn get(&self, id: OptionId) -> &'a OptionSpec {
        match id.scope {
            OptionScope::Global => &self.global[id.index],
            OptionScope::Local => &self.local[id.index],
        }
    }

    /// Every option in scope with its identity, globals first.
    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &'a OptionSpec)> + '_ {
        let local_specs = self.local;
        let global = self
            .global
            .iter()
            .enumerate()
            .filter(move |(_, spec)| !is_shadowed(local_specs, spec))
            .map(|(index, spec)| {
                (
                    OptionId {
                        scope: OptionScope::Global,
                        index,
                    },
                    spec,
                )
            });
        let local = self.local.iter().enumerate().map(|(index, spec)| {
            (
                OptionId {
                    scope: OptionScope::Local,
                    index,
                },
                spec,
            )
        });
        global.chain(local)
    }

    /// Returns `true` if `token` is a flag whose key names an option in scope.
    pub fn is_known_flag(&self, token: &str) -> bool {
        flag_key(token)
            .map(|key| key.split_once('=').map_or(key, |(k, _)| k))
            .is_some_and(|key| self.lookup.contains_key(key))
    }
}

/// Values produced by one parse, keyed by option identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedValues {
    pub options: BTreeMap<OptionId, Value>,
    /// Positional values, index-aligned with the declared arguments.
    pub arguments: Vec<Option<Value>>,
    /// Options that appeared on the command line.
    pub supplied: BTreeSet<OptionId>,
}

impl ParsedValues {
    fn new(slots: usize) -> Self {
        Self {
            options: BTreeMap::new(),
            arguments: vec![None; slots],
            supplied: BTreeSet::new(),
        }
    }

    fn append(&mut self, id: OptionId, items: Vec<String>) {
        match self.options.get_mut(&id) {
            Some(Value::Array(existing)) => existing.extend(items),
            _ => {
                self.options.insert(id, Value::Array(items));
            }
        }
    }

    /// Moves the values into a [`Context`] for `command`, storing each option
    /// under its key in the command or global bucket.
    pub fn into_context<'a>(self, table: &OptionTable<'a>, command: FoundCommand<'a>) -> Context<'a> {
        let mut ctx = Context::new(command);
        for (id, value) in self.options {
            let key = table.get(id).key().to_string();
            match id.scope {
                OptionScope::Global => ctx.global_option_values.insert(key, value),
                OptionScope::Local => ctx.option_values.insert(key, value),
            };
        }
        ctx.argument_values = self.arguments;
        ctx
    }
}

fn is_shadowed(local: &[OptionSpec], global: &OptionSpec) -> bool {
    local.iter().any(|l| l.name == global.name)
}

/// Strips the flag prefix (`--` or `-`) from `token`.
///
/// Returns `None` for non-flags, including a bare `-`.
pub fn flag_key(token: &str) -> Option<&str> {
    if token == "-" {
        return None;
    }
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
}

/// Lexical boolean: `true` or `false` in any case.
pub fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Splits a comma-separated list, dropping empty pieces.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Coerces a positional token according to its declared type.
fn coerce_positional(spec: &OptionSpec, raw: &str) -> Value {
    match spec.kind {
        OptionKind::Array { .. } => Value::Array(split_list(raw)),
        OptionKind::String { .. } => Value::String(raw.to_string()),
        OptionKind::Boolean { .. } => Value::Bool(parse_bool(raw).unwrap_or(!raw.is_empty())),
    }
}

/// Parses tokens for one resolved command.
pub struct Parser<'a, 'r> {
    command: &'r FoundCommand<'a>,
    table: &'r OptionTable<'a>,
    logger: &'r dyn Logger,
}

impl<'a, 'r> Parser<'a, 'r> {
    pub fn new(command: &'r FoundCommand<'a>, table: &'r OptionTable<'a>, logger: &'r dyn Logger) -> Self {
        Self {
            command,
            table,
            logger,
        }
    }

    /// Consumes `tokens` and applies defaults to whatever is still unset.
    ///
    /// # Errors
    ///
    /// Returns the first [`DispatchError::UnknownOption`],
    /// [`DispatchError::UnknownArgument`] or [`DispatchError::UnknownCommand`]
    /// encountered; parsing stops there.
    pub fn parse(&self, tokens: &[String]) -> Result<ParsedValues> {
        let mut queue: VecDeque<String> = tokens.iter().cloned().collect();
        let mut values = ParsedValues::new(self.command.node.arguments.len());
        let mut next_slot = 0;
        let mut flags_done = false;

        while let Some(token) = queue.pop_front() {
            if !flags_done && token == "--" {
                flags_done = true;
                continue;
            }

            let key = if flags_done {
                None
            } else {
                flag_key(&token).map(str::to_string)
            };
            match key {
                Some(key) => self.parse_flag(&key, &mut queue, &mut values)?,
                None => {
                    self.parse_positional(token, next_slot, &mut values)?;
                    next_slot += 1;
                }
            }
        }

        self.apply_defaults(&mut values);
        Ok(values)
    }

    fn parse_flag(
        &self,
        raw_key: &str,
        queue: &mut VecDeque<String>,
        values: &mut ParsedValues,
    ) -> Result<()> {
        let key = match raw_key.split_once('=') {
            Some((key, inline)) => {
                queue.push_front(inline.to_string());
                key
            }
            None => raw_key,
        };

        let id = self
            .table
            .resolve(key)
            .ok_or_else(|| DispatchError::UnknownOption {
                command: self.command.full_name.clone(),
                option: key.to_string(),
            })?;
        let spec = self.table.get(id);
        values.supplied.insert(id);

        match spec.kind {
            OptionKind::Boolean { .. } => {
                let value = match queue.front().and_then(|next| parse_bool(next)) {
                    Some(explicit) => {
                        queue.pop_front();
                        explicit
                    }
                    None => true,
                };
                self.logger
                    .debug(&format!("option '{}' ({:?}) = {value}", spec.name, id.scope));
                values.options.insert(id, Value::Bool(value));
            }
            OptionKind::String { .. } => match self.take_value(queue) {
                Some(raw) => {
                    self.logger
                        .debug(&format!("option '{}' ({:?}) = {raw:?}", spec.name, id.scope));
                    values.options.insert(id, Value::String(raw));
                }
                None => self
                    .logger
                    .debug(&format!("option '{}' given without a value", spec.name)),
            },
            OptionKind::Array { .. } => match self.take_value(queue) {
                Some(raw) => {
                    let items = split_list(&raw);
                    self.logger
                        .debug(&format!("option '{}' ({:?}) += {items:?}", spec.name, id.scope));
                    values.append(id, items);
                }
                None => self
                    .logger
                    .debug(&format!("option '{}' given without a value", spec.name)),
            },
        }

        Ok(())
    }

    /// Takes the next token as a value unless it names a known flag or is
    /// the `--` terminator.
    fn take_value(&self, queue: &mut VecDeque<String>) -> Option<String> {
        match queue.front() {
            Some(next) if next != "--" && !self.table.is_known_flag(next) => queue.pop_front(),
            _ => None,
        }
    }

    fn parse_positional(&self, token: String, slot: usize, values: &mut ParsedValues) -> Result<()> {
        let node = self.command.node;

        if node.arguments.is_empty() {
            let suggestion = suggest(&token, node.subcommands.iter().map(|s| s.name.as_str()));
            self.logger.debug(&format!(
                "'{token}' is not a subcommand of '{}' (suggestion: {suggestion:?})",
                self.command.full_name
            ));
            return Err(DispatchError::UnknownCommand {
                command: self.command.full_name.clone(),
                name: token,
                suggestion,
            });
        }

        let Some(spec) = node.arguments.get(slot) else {
            return Err(DispatchError::UnknownArgument {
                command: self.command.full_name.clone(),
                argument: token,
            });
        };

        let value = coerce_positional(spec, &token);
        self.logger
            .debug(&format!("argument '{}' = {value:?}", spec.name));
        values.arguments[slot] = Some(value);
        Ok(())
    }

    fn apply_defaults(&self, values: &mut ParsedValues) {
        for (id, spec) in self.table.iter() {
            if values.options.contains_key(&id) {
                continue;
            }
            if let Some(default) = spec.default_value() {
                self.logger
                    .debug(&format!("option '{}' defaulted to {default:?}", spec.name));
                values.options.insert(id, default);
            }
        }

        for (slot, spec) in self.command.node.arguments.iter().enumerate() {
            if values.arguments[slot].is_none() {
                values.arguments[slot] = spec.default_value();
            }
        }
    }
}
