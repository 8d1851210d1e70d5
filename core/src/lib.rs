//! Declaration types and per-invocation context for command dispatch.
//!
//! This crate defines the data model shared by the dispatch engine and its
//! callers:
//!
//! - [`CommandNode`] - a command with aliases, options, positional
//!   arguments, nested subcommands and an optional handler.
//! - [`OptionSpec`] - a flag option or positional argument, typed through
//!   [`OptionKind`].
//! - [`Value`] - a parsed boolean, string or string array.
//! - [`Context`] - the parsed state of one invocation, handed to handlers.
//!
//! Validation ([`validate_tree`]) catches declaration errors such as
//! duplicate names and colliding short names before dispatch.
//!
//! Loading ([`load_tree`]) reads a tree authored as JSON or YAML.
//!
//! # Example
//!
//! ```
//! use command_dispatch_core::*;
//!
//! let root = CommandNode::new("mycli")
//!     .with_option(OptionSpec::boolean("verbose").with_short("v"))
//!     .with_subcommand(
//!         CommandNode::new("run")
//!             .with_option(OptionSpec::string("port"))
//!             .with_argument(OptionSpec::string("script").required()),
//!     );
//!
//! assert_eq!(root.find_subcommand("run").unwrap().name, "run");
//! assert!(root.find_option("verbose").is_some());
//! assert!(validate_tree(&root).is_empty());
//! ```

mod context;
mod load;
mod types;
mod validate;

pub use context::{Context, FoundCommand};
pub use load::{LoadError, from_json_str, from_yaml_str, load_tree};
pub use types::*;
pub use validate::{DeclarationError, validate_tree};
