//! Declaration tree validation.
//!
//! Checks the structural invariants the dispatch engine relies on: unique
//! option and argument names per node, short names that do not collide
//! within a resolved scope, unique sibling subcommands, and defaults that sit
//! inside their own choice sets.
//!
//! # Examples
//!
//! ```
//! use command_dispatch_core::*;
//!
//! let root = CommandNode::new("app")
//!     .with_option(OptionSpec::boolean("verbose").with_short("v"));
//! assert!(validate_tree(&root).is_empty());
//!
//! // Invalid: subcommand short name collides with a global option
//! let bad = CommandNode::new("app")
//!     .with_option(OptionSpec::boolean("verbose").with_short("v"))
//!     .with_subcommand(
//!         CommandNode::new("run").with_option(OptionSpec::string("version").with_short("v")),
//!     );
//! assert!(!validate_tree(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandNode, OptionKind, OptionSpec};

/// Declaration validation errors.
///
/// Every variant names the full command path it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty (under '{0}')")]
    EmptyCommandName(String),
    /// Option or argument name is empty or whitespace-only.
    #[error("option or argument name cannot be empty in '{0}'")]
    EmptyOptionName(String),
    #[error("duplicate option '{name}' in '{command}'")]
    DuplicateOption { command: String, name: String },
    #[error("duplicate argument '{name}' in '{command}'")]
    DuplicateArgument { command: String, name: String },
    /// A short name equals another option's name or short name in scope.
    #[error("short name '{short}' of option '{option}' collides with another option in '{command}'")]
    ShortNameCollision {
        command: String,
        option: String,
        short: String,
    },
    /// Two siblings share a name or alias.
    #[error("duplicate subcommand '{name}' in '{command}'")]
    DuplicateSubcommand { command: String, name: String },
    #[error("default '{value}' of '{option}' in '{command}' is not one of its choices")]
    DefaultNotInChoices {
        command: String,
        option: String,
        value: String,
    },
}

/// Validates a declaration tree, returning every problem found in tree order.
///
/// # Examples
///
/// ```
/// use command_dispatch_core::*;
///
/// let root = CommandNode::new("app")
///     .with_subcommand(CommandNode::new("build"))
///     .with_subcommand(CommandNode::new("test").with_alias("build"));
/// let errors = validate_tree(&root);
/// assert!(errors.iter().any(|e| matches!(e, DeclarationError::DuplicateSubcommand { .. })));
/// ```
pub fn validate_tree(root: &CommandNode) -> Vec<DeclarationError> {
    let mut errors = Vec::new();

    if root.name.trim().is_empty() {
        errors.push(DeclarationError::EmptyCommandName(String::new()));
        return errors;
    }

    let mut path = vec![root.name.clone()];
    validate_node(root, root, &mut path, &mut errors);
    errors
}

fn validate_node(
    node: &CommandNode,
    root: &CommandNode,
    path: &mut Vec<String>,
    errors: &mut Vec<DeclarationError>,
) {
    let command = path.join(" ");
    let is_root = path.len() == 1;

    validate_specs(&node.options, &command, errors, |name| {
        DeclarationError::DuplicateOption {
            command: command.clone(),
            name,
        }
    });
    validate_specs(&node.arguments, &command, errors, |name| {
        DeclarationError::DuplicateArgument {
            command: command.clone(),
            name,
        }
    });

    let globals: &[OptionSpec] = if is_root { &[] } else { &root.options };
    validate_short_names(&node.options, globals, &command, errors);

    let mut seen: HashSet<&str> = HashSet::new();
    for sub in &node.subcommands {
        let name = sub.name.trim();
        if name.is_empty() {
            errors.push(DeclarationError::EmptyCommandName(command.clone()));
            continue;
        }

        for token in std::iter::once(name).chain(sub.aliases.iter().map(String::as_str)) {
            if !seen.insert(token) {
                errors.push(DeclarationError::DuplicateSubcommand {
                    command: command.clone(),
                    name: token.to_string(),
                });
            }
        }

        path.push(name.to_string());
        validate_node(sub, root, path, errors);
        path.pop();
    }
}

fn validate_specs(
    specs: &[OptionSpec],
    command: &str,
    errors: &mut Vec<DeclarationError>,
    duplicate: impl Fn(String) -> DeclarationError,
) {
    let mut seen = HashSet::new();

    for spec in specs {
        if spec.name.trim().is_empty() {
            errors.push(DeclarationError::EmptyOptionName(command.to_string()));
            continue;
        }
        if !seen.insert(spec.name.as_str()) {
            errors.push(duplicate(spec.name.clone()));
        }
        validate_default_choice(spec, command, errors);
    }
}

fn validate_default_choice(spec: &OptionSpec, command: &str, errors: &mut Vec<DeclarationError>) {
    let (defaults, choices): (Vec<&String>, &[String]) = match &spec.kind {
        OptionKind::String {
            default: Some(value),
            choices,
        } => (vec![value], choices.as_slice()),
        OptionKind::Array {
            default: Some(values),
            choices,
        } => (values.iter().collect(), choices.as_slice()),
        _ => return,
    };
    if choices.is_empty() || spec.skip_validation {
        return;
    }

    if let Some(value) = defaults.into_iter().find(|v| !choices.contains(*v)) {
        errors.push(DeclarationError::DefaultNotInChoices {
            command: command.to_string(),
            option: spec.name.clone(),
            value: value.clone(),
        });
    }
}

/// Local options shadow globals of the same name, so shadowed globals are
/// left out of the scope. A global's short name is only checked against the
/// local options; collisions among globals are reported on the root.
fn validate_short_names(
    local: &[OptionSpec],
    globals: &[OptionSpec],
    command: &str,
    errors: &mut Vec<DeclarationError>,
) {
    let visible_globals: Vec<&OptionSpec> = globals
        .iter()
        .filter(|g| !local.iter().any(|l| l.name == g.name))
        .collect();
    let scope: Vec<&OptionSpec> = local
        .iter()
        .chain(visible_globals.iter().copied())
        .collect();

    let checks = local
        .iter()
        .map(|option| (option, scope.as_slice()))
        .chain(visible_globals.iter().map(|option| (*option, &scope[..local.len()])));

    for (option, others) in checks {
        let Some(short) = option.short_name.as_deref() else {
            continue;
        };
        let collides = others.iter().any(|other| {
            !std::ptr::eq(*other, option)
                && (other.name == short || other.short_name.as_deref() == Some(short))
        });
        if collides {
            errors.push(DeclarationError::ShortNameCollision {
                command: command.to_string(),
                option: option.name.clone(),
                short: short.to_string(),
            });
        }
    }
}
