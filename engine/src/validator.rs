//! Post-parse validation.
//!
//! Runs over the resolved command's own options, then its positional
//! arguments, each in declaration order. The first failure is returned.

use command_dispatch_core::{FoundCommand, OptionSpec, Value};

use crate::error::{DispatchError, Result};
use crate::parser::{OptionId, OptionScope, ParsedValues};

/// Checks required-ness and choice membership for the resolved command.
///
/// Defaults have already been applied by the parser, so "required" means the
/// value is still unset.
///
/// # Errors
///
/// Returns [`DispatchError::MissingRequiredOption`],
/// [`DispatchError::MissingRequiredArgument`] or
/// [`DispatchError::InvalidChoice`].
pub fn validate(command: &FoundCommand<'_>, values: &ParsedValues) -> Result<()> {
    let node = command.node;

    for (index, spec) in node.options.iter().enumerate() {
        let id = OptionId {
            scope: OptionScope::Local,
            index,
        };
        let value = values.options.get(&id);
        if spec.required && value.is_none() {
            return Err(DispatchError::MissingRequiredOption {
                command: command.full_name.clone(),
                option: spec.name.clone(),
            });
        }
        check_choices(command, spec, value)?;
    }

    for (slot, spec) in node.arguments.iter().enumerate() {
        let value = values.arguments.get(slot).and_then(Option::as_ref);
        if spec.required && value.is_none() {
            return Err(DispatchError::MissingRequiredArgument {
                command: command.full_name.clone(),
                argument: spec.name.clone(),
            });
        }
        check_choices(command, spec, value)?;
    }

    Ok(())
}

fn check_choices(command: &FoundCommand<'_>, spec: &OptionSpec, value: Option<&Value>) -> Result<()> {
    let choices = spec.choices();
    if choices.is_empty() || spec.skip_validation {
        return Ok(());
    }

    let offending = match value {
        Some(Value::String(s)) => (!choices.contains(s)).then_some(s),
        Some(Value::Array(items)) => items.iter().find(|item| !choices.contains(*item)),
        _ => None,
    };

    match offending {
        Some(bad) => Err(DispatchError::InvalidChoice {
            command: command.full_name.clone(),
            option: spec.name.clone(),
            value: bad.clone(),
            choices: choices.to_vec(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use command_dispatch_core::CommandNode;

    use super::*;
    use crate::logger::MemoryLogger;
    use crate::parser::{OptionTable, Parser};
    use crate::resolve;

    fn check(root: &CommandNode, args: &[&str]) -> Result<()> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let (found, rest) = resolve(root, &args);
        let table = OptionTable::new(&found);
        let values = Parser::new(&found, &table, &MemoryLogger::new()).parse(rest)?;
        validate(&found, &values)
    }

    fn tree() -> CommandNode {
        CommandNode::new("app").with_subcommand(
            CommandNode::new("deploy")
                .with_option(OptionSpec::string("env").with_choices(["dev", "staging"]))
                .with_option(OptionSpec::string("region").required().with_default("eu"))
                .with_option(OptionSpec::array("tag").with_choices(["a", "b"]))
                .with_option(
                    OptionSpec::string("raw")
                        .with_choices(["x"])
                        .skip_validation(),
                )
                .with_argument(OptionSpec::string("target").required()),
        )
    }

    #[test]
    fn test_valid_invocation() {
        assert!(check(&tree(), &["deploy", "--env", "dev", "--tag=a,b", "web"]).is_ok());
    }

    #[test]
    fn test_invalid_string_choice() {
        let err = check(&tree(), &["deploy", "--env=prod", "web"]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidChoice { ref option, ref value, .. } if option == "env" && value == "prod"
        ));
    }

    #[test]
    fn test_invalid_array_element_names_first_offender() {
        let err = check(&tree(), &["deploy", "--tag=a,z,y", "web"]).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidChoice { ref value, .. } if value == "z"));
    }

    #[test]
    fn test_skip_validation_bypasses_choices() {
        assert!(check(&tree(), &["deploy", "--raw", "anything", "web"]).is_ok());
    }

    #[test]
    fn test_missing_required_argument() {
        let err = check(&tree(), &["deploy"]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::MissingRequiredArgument { ref argument, .. } if argument == "target"
        ));
    }

    #[test]
    fn test_options_are_checked_before_arguments() {
        let root = CommandNode::new("app")
            .with_option(OptionSpec::string("token").required())
            .with_argument(OptionSpec::string("path").required());
        let err = check(&root, &[]).unwrap_err();
        assert!(matches!(err, DispatchError::MissingRequiredOption { ref option, .. } if option == "token"));
    }
}
