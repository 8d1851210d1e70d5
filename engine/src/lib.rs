//! Command-line dispatch over a declared command tree.
//!
//! Given a [`CommandNode`] tree, the engine resolves the invoked command
//! from raw arguments, parses flags and positionals against its
//! declarations, validates required values and choice sets, and invokes the
//! command's handler with a populated [`Context`].
//!
//! # Pipeline
//!
//! - [`resolve`] - walk the tree by exact name or alias.
//! - [`parser::Parser`] - tokenize and fill values keyed by option identity.
//! - [`validate`] - required-ness and choices, first failure wins.
//! - [`Engine`] - orchestrates the phases and the `--help` / `--version`
//!   short-circuits.
//!
//! # Example
//!
//! ```
//! use command_dispatch::{Engine, MemoryLogger, Outcome};
//! use command_dispatch_core::{CommandNode, OptionSpec};
//!
//! let root = CommandNode::new("mycli")
//!     .with_option(OptionSpec::boolean("verbose").with_short("v"))
//!     .with_subcommand(
//!         CommandNode::new("greet")
//!             .with_option(OptionSpec::string("name").with_default("world"))
//!             .with_handler(|ctx| {
//!                 assert_eq!(ctx.string("name"), Some("ferris"));
//!                 assert!(ctx.flag("verbose"));
//!                 Ok(())
//!             }),
//!     );
//!
//! let engine = Engine::builder(root)
//!     .logger(MemoryLogger::new())
//!     .build()
//!     .unwrap();
//!
//! let outcome = engine.start(["mycli", "greet", "--name=ferris", "-v"]).unwrap();
//! assert_eq!(outcome, Outcome::Executed);
//! ```
//!
//! [`CommandNode`]: command_dispatch_core::CommandNode
//! [`Context`]: command_dispatch_core::Context

pub mod distance;
pub mod engine;
pub mod error;
pub mod help;
pub mod logger;
pub mod parser;
pub mod resolver;
pub mod validator;

pub use engine::{ArgvMode, DEFAULT_VERSION, Engine, EngineBuilder, Outcome};
pub use error::{DispatchError, ErrorKind, Result};
pub use help::{HelpFormatter, MarkdownHelpFormatter, PlainHelpFormatter};
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use resolver::resolve;
pub use validator::validate;
