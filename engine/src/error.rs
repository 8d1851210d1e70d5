//! Error types for dispatch failures.
//!
//! The taxonomy is closed: every failure of the resolve, parse, validate and
//! execute phases maps to one [`DispatchError`] variant. The first error wins
//! and is returned to the caller; nothing is printed and nothing exits.

use command_dispatch_core::HandlerError;
use thiserror::Error;

/// Coarse classification of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownOption,
    UnknownArgument,
    UnknownCommand,
    MissingRequiredOption,
    MissingRequiredArgument,
    InvalidChoice,
    HandlerError,
}

/// Errors that can occur while dispatching an invocation.
///
/// Every variant carries the full name of the command it was raised for.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A flag whose key matches no option in scope.
    #[error("unknown option '{option}' for '{command}'")]
    UnknownOption { command: String, option: String },

    /// A positional token after every declared argument slot was filled.
    #[error("unexpected argument '{argument}' for '{command}'")]
    UnknownArgument { command: String, argument: String },

    /// A positional token given to a command that declares no arguments, so
    /// it was meant as a subcommand.
    #[error("unknown command '{name}' for '{command}'{}", did_you_mean(.suggestion))]
    UnknownCommand {
        command: String,
        name: String,
        suggestion: Option<String>,
    },

    #[error("missing required option '{option}' for '{command}'")]
    MissingRequiredOption { command: String, option: String },

    #[error("missing required argument '{argument}' for '{command}'")]
    MissingRequiredArgument { command: String, argument: String },

    /// A supplied value outside the declared choice set.
    #[error("invalid value '{value}' for '{option}' of '{command}' (choices: {})", .choices.join(", "))]
    InvalidChoice {
        command: String,
        option: String,
        value: String,
        choices: Vec<String>,
    },

    /// The handler returned an error.
    #[error("command '{command}' failed: {source}")]
    HandlerFailed {
        command: String,
        #[source]
        source: HandlerError,
    },

    /// The handler panicked; the panic was caught at the invocation boundary.
    #[error("command '{command}' panicked: {message}")]
    HandlerPanicked { command: String, message: String },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownOption { .. } => ErrorKind::UnknownOption,
            DispatchError::UnknownArgument { .. } => ErrorKind::UnknownArgument,
            DispatchError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            DispatchError::MissingRequiredOption { .. } => ErrorKind::MissingRequiredOption,
            DispatchError::MissingRequiredArgument { .. } => ErrorKind::MissingRequiredArgument,
            DispatchError::InvalidChoice { .. } => ErrorKind::InvalidChoice,
            DispatchError::HandlerFailed { .. } | DispatchError::HandlerPanicked { .. } => {
                ErrorKind::HandlerError
            }
        }
    }

    /// Full name of the command the error was raised for.
    pub fn command(&self) -> &str {
        match self {
            DispatchError::UnknownOption { command, .. }
            | DispatchError::UnknownArgument { command, .. }
            | DispatchError::UnknownCommand { command, .. }
            | DispatchError::MissingRequiredOption { command, .. }
            | DispatchError::MissingRequiredArgument { command, .. }
            | DispatchError::InvalidChoice { command, .. }
            | DispatchError::HandlerFailed { command, .. }
            | DispatchError::HandlerPanicked { command, .. } => command,
        }
    }

    /// Did-you-mean hint for [`DispatchError::UnknownCommand`].
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            DispatchError::UnknownCommand { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_message_includes_suggestion() {
        let err = DispatchError::UnknownCommand {
            command: "app".to_string(),
            name: "buidl".to_string(),
            suggestion: Some("build".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unknown command 'buidl' for 'app' (did you mean 'build'?)"
        );
        assert_eq!(err.suggestion(), Some("build"));
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
    }

    #[test]
    fn test_invalid_choice_message() {
        let err = DispatchError::InvalidChoice {
            command: "app deploy".to_string(),
            option: "env".to_string(),
            value: "prod".to_string(),
            choices: vec!["dev".to_string(), "staging".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "invalid value 'prod' for 'env' of 'app deploy' (choices: dev, staging)"
        );
        assert_eq!(err.command(), "app deploy");
    }

    #[test]
    fn test_handler_failure_keeps_source() {
        let err = DispatchError::HandlerFailed {
            command: "app".to_string(),
            source: "disk full".into(),
        };
        assert_eq!(err.kind(), ErrorKind::HandlerError);
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("disk full".to_string())
        );
    }
}
