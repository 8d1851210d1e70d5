//! Command resolution.
//!
//! Walks the command tree from the root, consuming leading tokens while each
//! one names a child exactly (by name or alias). Fuzzy matching is not done
//! here; it only feeds error hints (see [`crate::distance`]).

use command_dispatch_core::{CommandNode, FoundCommand};

/// Resolves the deepest command reachable by a prefix of `tokens`.
///
/// Returns the found command and the tokens left after the last matched
/// name. Stops at the first token that names no child, including flags.
///
/// # Examples
///
/// ```
/// use command_dispatch::resolve;
/// use command_dispatch_core::CommandNode;
///
/// let root = CommandNode::new("git").with_subcommand(
///     CommandNode::new("remote").with_subcommand(CommandNode::new("add")),
/// );
/// let tokens: Vec<String> = ["remote", "add", "origin"].map(String::from).to_vec();
///
/// let (found, rest) = resolve(&root, &tokens);
/// assert_eq!(found.full_name, "git remote add");
/// assert_eq!(rest, ["origin"]);
/// ```
pub fn resolve<'a, 't>(root: &'a CommandNode, tokens: &'t [String]) -> (FoundCommand<'a>, &'t [String]) {
    let mut found = FoundCommand::new(root);
    let mut node = root;

    let mut consumed = 0;
    while let Some(child) = tokens
        .get(consumed)
        .and_then(|token| node.find_subcommand(token))
    {
        node = child;
        found.path.push(tokens[consumed].clone());
        consumed += 1;
    }

    found.node = node;
    if !found.path.is_empty() {
        found.full_name = format!("{} {}", root.name, found.path.join(" "));
    }

    (found, &tokens[consumed..])
}
