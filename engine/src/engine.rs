//! Dispatch orchestration.
//!
//! One [`Engine::start`] call runs the whole pipeline:
//!
//! ```text
//! argv -> strip program name -> resolve -> parse -> validate
//!      -> after-parse hook -> --version / --help -> handler (or help)
//! ```
//!
//! Every phase short-circuits on its first error. `--help` and `--version`
//! are only honored after validation has passed, so a missing required
//! option is reported even when `--help` is present.

use std::panic::{self, AssertUnwindSafe};

use command_dispatch_core::{
    CommandNode, Context, DeclarationError, Handler, Value, validate_tree,
};

use crate::error::{DispatchError, Result};
use crate::help::{HelpFormatter, PlainHelpFormatter};
use crate::logger::{Logger, TracingLogger};
use crate::parser::{OptionTable, Parser};
use crate::resolver::resolve;
use crate::validator::validate;

/// Version reported when neither the builder nor the root declares one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// How many leading argv entries identify the program rather than carry
/// user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgvMode {
    /// `argv[0]` is the program.
    #[default]
    Standard,
    /// A host runtime injects its own executable ahead of the program, so two
    /// entries are stripped.
    HostRuntime,
}

impl ArgvMode {
    fn skip(self) -> usize {
        match self {
            ArgvMode::Standard => 1,
            ArgvMode::HostRuntime => 2,
        }
    }
}

/// Successful result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resolved command's handler ran and returned `Ok`.
    Executed,
    /// The global `--version` flag was set; carries the version string.
    Version(String),
    /// Help was rendered, either for `--help` or because the resolved command
    /// has no handler.
    Help(String),
}

/// Builder for [`Engine`].
///
/// # Examples
///
/// ```
/// use command_dispatch::{ArgvMode, Engine, MemoryLogger};
/// use command_dispatch_core::{CommandNode, OptionSpec};
///
/// let root = CommandNode::new("app").with_option(OptionSpec::boolean("version"));
/// let engine = Engine::builder(root)
///     .version("2.1.0")
///     .logger(MemoryLogger::new())
///     .argv_mode(ArgvMode::Standard)
///     .build()
///     .unwrap();
/// assert_eq!(engine.root().name, "app");
/// ```
pub struct EngineBuilder {
    root: CommandNode,
    logger: Box<dyn Logger>,
    help: Box<dyn HelpFormatter>,
    version: Option<String>,
    argv_mode: ArgvMode,
}

impl EngineBuilder {
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    pub fn help_formatter(mut self, help: impl HelpFormatter + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    /// Overrides the version reported by `--version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn argv_mode(mut self, mode: ArgvMode) -> Self {
        self.argv_mode = mode;
        self
    }

    /// Validates the declaration tree and builds the engine.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeclarationError`] found in the tree.
    pub fn build(self) -> std::result::Result<Engine, DeclarationError> {
        if let Some(first) = validate_tree(&self.root).into_iter().next() {
            return Err(first);
        }

        Ok(Engine {
            root: self.root,
            logger: self.logger,
            help: self.help,
            version: self.version,
            argv_mode: self.argv_mode,
        })
    }
}

/// Resolves, parses, validates and dispatches invocations against one
/// declaration tree.
///
/// The engine holds no per-invocation state; each call builds a fresh
/// [`Context`], so repeated calls never see each other's values.
pub struct Engine {
    root: CommandNode,
    logger: Box<dyn Logger>,
    help: Box<dyn HelpFormatter>,
    version: Option<String>,
    argv_mode: ArgvMode,
}

impl Engine {
    pub fn builder(root: CommandNode) -> EngineBuilder {
        EngineBuilder {
            root,
            logger: Box::new(TracingLogger),
            help: Box::new(PlainHelpFormatter),
            version: None,
            argv_mode: ArgvMode::default(),
        }
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Dispatches a full process argument vector, program name included.
    ///
    /// # Errors
    ///
    /// Returns the first [`DispatchError`] raised by any phase.
    pub fn start<I, S>(&self, argv: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(&self.user_tokens(argv))
    }

    /// Strips the program entries from `argv` according to the argv mode.
    pub fn user_tokens<I, S>(&self, argv: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        argv.into_iter()
            .skip(self.argv_mode.skip())
            .map(Into::into)
            .collect()
    }

    /// Dispatches the current process arguments.
    pub fn start_from_env(&self) -> Result<Outcome> {
        self.start(std::env::args())
    }

    /// Dispatches user tokens with the program name already stripped.
    ///
    /// # Errors
    ///
    /// Returns the first [`DispatchError`] raised by any phase.
    pub fn run(&self, tokens: &[String]) -> Result<Outcome> {
        let mut ctx = self.parse(tokens)?;
        let node = ctx.command.node;

        if let Some(hook) = &node.after_parse {
            if let Err(err) = hook.call(&mut ctx) {
                self.logger.warn(&format!(
                    "after-parse hook of '{}' failed: {err}",
                    ctx.command.full_name
                ));
            }
        }

        if global_flag(&ctx, "version") {
            let version = self
                .version
                .clone()
                .or_else(|| self.root.version.clone())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string());
            self.logger.info(&version);
            return Ok(Outcome::Version(version));
        }

        if global_flag(&ctx, "help") {
            return Ok(Outcome::Help(self.emit_help(&ctx)));
        }

        match &node.execute {
            Some(handler) => self.invoke(handler, &ctx),
            None => {
                self.logger.debug(&format!(
                    "'{}' has no handler; rendering help",
                    ctx.command.full_name
                ));
                Ok(Outcome::Help(self.emit_help(&ctx)))
            }
        }
    }

    /// Resolves, parses and validates `tokens` without running anything.
    ///
    /// # Errors
    ///
    /// Returns the first parse or validation [`DispatchError`].
    pub fn parse<'a>(&'a self, tokens: &[String]) -> Result<Context<'a>> {
        self.logger.debug(&format!("arguments: {tokens:?}"));

        let (found, rest) = resolve(&self.root, tokens);
        self.logger.debug(&format!(
            "matched command '{}' (remaining: {rest:?})",
            found.full_name
        ));

        let table = OptionTable::new(&found);
        let values = Parser::new(&found, &table, self.logger.as_ref()).parse(rest)?;
        validate(&found, &values)?;

        let supplied: Vec<&str> = {
            let mut keys: Vec<&str> = values
                .supplied
                .iter()
                .map(|id| table.get(*id).key())
                .collect();
            keys.sort_unstable();
            keys.dedup();
            keys
        };
        let full_name = found.full_name.clone();
        let options = supplied.join(",");

        let mut ctx = values.into_context(&table, found);
        ctx.telemetry_properties
            .insert("command".to_string(), full_name);
        ctx.telemetry_properties
            .insert("options".to_string(), options);

        self.logger
            .debug(&format!("parsed context: {}", ctx.to_json()));
        Ok(ctx)
    }

    /// Renders help for the command reached by `path` (names or aliases),
    /// or `None` if the path does not resolve completely.
    pub fn render_help(&self, path: &[String]) -> Option<String> {
        let (found, rest) = resolve(&self.root, path);
        if !rest.is_empty() {
            return None;
        }
        let root = (!found.is_root()).then_some(&self.root);
        Some(self.help.format_help(&found, root))
    }

    fn emit_help(&self, ctx: &Context<'_>) -> String {
        let root = (!ctx.command.is_root()).then_some(ctx.command.root);
        let text = self.help.format_help(&ctx.command, root);
        self.logger.info(&text);
        text
    }

    fn invoke(&self, handler: &Handler, ctx: &Context<'_>) -> Result<Outcome> {
        let command = ctx.command.full_name.clone();
        self.logger.debug(&format!("executing '{command}'"));

        match panic::catch_unwind(AssertUnwindSafe(|| handler.call(ctx))) {
            Ok(Ok(())) => Ok(Outcome::Executed),
            Ok(Err(source)) => {
                self.logger
                    .error(&format!("command '{command}' failed: {source}"));
                Err(DispatchError::HandlerFailed { command, source })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.logger
                    .error(&format!("command '{command}' panicked: {message}"));
                Err(DispatchError::HandlerPanicked { command, message })
            }
        }
    }
}

/// Reads a boolean declared on the root, from whichever bucket it landed in.
fn global_flag(ctx: &Context<'_>, name: &str) -> bool {
    let Some(spec) = ctx
        .command
        .root
        .options
        .iter()
        .find(|o| o.name == name && o.is_boolean())
    else {
        return false;
    };

    let bucket = if ctx.command.is_root() {
        &ctx.option_values
    } else {
        &ctx.global_option_values
    };
    bucket
        .get(spec.key())
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use command_dispatch_core::OptionSpec;

    use super::*;
    use crate::logger::MemoryLogger;

    #[test]
    fn test_argv_mode_skip() {
        assert_eq!(ArgvMode::Standard.skip(), 1);
        assert_eq!(ArgvMode::HostRuntime.skip(), 2);
    }

    #[test]
    fn test_user_tokens_follow_argv_mode() {
        let engine = Engine::builder(CommandNode::new("app"))
            .argv_mode(ArgvMode::HostRuntime)
            .logger(MemoryLogger::new())
            .build()
            .unwrap();
        assert_eq!(engine.user_tokens(["node", "app.js", "build"]), vec!["build"]);
        assert!(engine.user_tokens(["node"]).is_empty());
    }

    #[test]
    fn test_build_rejects_invalid_tree() {
        let root = CommandNode::new("app")
            .with_option(OptionSpec::boolean("a"))
            .with_option(OptionSpec::boolean("a"));
        assert!(matches!(
            Engine::builder(root).build(),
            Err(DeclarationError::DuplicateOption { .. })
        ));
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }

    #[test]
    fn test_render_help_requires_full_path() {
        let engine = Engine::builder(CommandNode::new("app").with_subcommand(CommandNode::new("build")))
            .logger(MemoryLogger::new())
            .build()
            .unwrap();
        assert!(engine.render_help(&["build".to_string()]).is_some());
        assert!(engine.render_help(&["nope".to_string()]).is_none());
    }
}
