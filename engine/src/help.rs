//! Help text rendering.
//!
//! The engine asks a [`HelpFormatter`] for text on `--help` and when a
//! resolved command has no handler. [`PlainHelpFormatter`] renders aligned
//! terminal text; [`MarkdownHelpFormatter`] renders tables.

use command_dispatch_core::{CommandNode, FoundCommand, OptionKind, OptionSpec, Value};

/// Renders help text for a resolved command.
pub trait HelpFormatter: Send + Sync {
    /// `root` is `Some` when the resolved command is not the root itself,
    /// so the root's options can be listed as globals.
    fn format_help(&self, command: &FoundCommand<'_>, root: Option<&CommandNode>) -> String;
}

/// Aligned, clap-style terminal help.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHelpFormatter;

/// Markdown help with one table per section.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownHelpFormatter;

fn option_label(spec: &OptionSpec) -> String {
    let long = format!("--{}", spec.name);
    let flag = match &spec.short_name {
        Some(short) => format!("-{short}, {long}"),
        None => long,
    };
    match spec.kind {
        OptionKind::Boolean { .. } => flag,
        OptionKind::String { .. } => format!("{flag} <{}>", spec.name),
        OptionKind::Array { .. } => format!("{flag} <{}>...", spec.name),
    }
}

fn argument_label(spec: &OptionSpec) -> String {
    let ellipsis = if matches!(spec.kind, OptionKind::Array { .. }) {
        "..."
    } else {
        ""
    };
    if spec.required {
        format!("<{}>{ellipsis}", spec.name)
    } else {
        format!("[{}]{ellipsis}", spec.name)
    }
}

fn command_label(node: &CommandNode) -> String {
    std::iter::once(node.name.as_str())
        .chain(node.aliases.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Description plus `[required]`, `[choices: ..]` and `[default: ..]` notes.
fn describe(spec: &OptionSpec) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(desc) = &spec.description {
        parts.push(desc.clone());
    }
    if spec.required {
        parts.push("[required]".to_string());
    }
    if !spec.choices().is_empty() {
        parts.push(format!("[choices: {}]", spec.choices().join(", ")));
    }
    if let Some(default) = spec.default_value() {
        let shown = match default {
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s,
            Value::Array(items) => items.join(","),
        };
        parts.push(format!("[default: {shown}]"));
    }
    parts.join(" ")
}

fn push_section(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(4);

    out.push_str(&format!("\n{title}:\n"));
    for (label, desc) in rows {
        if desc.is_empty() {
            out.push_str(&format!("  {label}\n"));
        } else {
            out.push_str(&format!("  {label:<width$}  {desc}\n"));
        }
    }
}

fn usage_line(command: &FoundCommand<'_>, root: Option<&CommandNode>) -> String {
    let node = command.node;
    let mut usage = format!("Usage: {}", command.full_name);

    let has_globals = root.is_some_and(|r| !r.options.is_empty());
    if !node.options.is_empty() || has_globals {
        usage.push_str(" [OPTIONS]");
    }
    if !node.subcommands.is_empty() {
        usage.push_str(" <COMMAND>");
    }
    for arg in &node.arguments {
        usage.push(' ');
        usage.push_str(&argument_label(arg));
    }
    usage
}

impl HelpFormatter for PlainHelpFormatter {
    fn format_help(&self, command: &FoundCommand<'_>, root: Option<&CommandNode>) -> String {
        let node = command.node;
        let mut out = usage_line(command, root);
        out.push('\n');

        if let Some(desc) = &node.description {
            out.push_str(&format!("\n{desc}\n"));
        }

        let rows = |specs: &[OptionSpec], label: fn(&OptionSpec) -> String| {
            specs
                .iter()
                .map(|s| (label(s), describe(s)))
                .collect::<Vec<_>>()
        };

        push_section(&mut out, "Arguments", &rows(&node.arguments, argument_label));
        push_section(&mut out, "Options", &rows(&node.options, option_label));
        if let Some(root) = root {
            push_section(&mut out, "Global Options", &rows(&root.options, option_label));
        }

        let commands: Vec<(String, String)> = node
            .subcommands
            .iter()
            .map(|s| (command_label(s), s.description.clone().unwrap_or_default()))
            .collect();
        push_section(&mut out, "Commands", &commands);

        out
    }
}

fn push_table(out: &mut String, title: &str, header: &str, rows: Vec<String>) {
    if rows.is_empty() {
        return;
    }
    let columns = header.matches('|').count() - 1;
    out.push_str(&format!("## {title}\n\n"));
    out.push_str(header);
    out.push('\n');
    out.push('|');
    out.push_str(&"---|".repeat(columns));
    out.push('\n');
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    out.push('\n');
}

fn option_rows(specs: &[OptionSpec]) -> Vec<String> {
    specs
        .iter()
        .map(|s| {
            format!(
                "| `{}` | {} | {} |",
                option_label(s),
                s.kind.type_name(),
                describe(s)
            )
        })
        .collect()
}

impl HelpFormatter for MarkdownHelpFormatter {
    fn format_help(&self, command: &FoundCommand<'_>, root: Option<&CommandNode>) -> String {
        let node = command.node;
        let mut out = format!("# {}\n\n", command.full_name);

        if let Some(desc) = &node.description {
            out.push_str(&format!("{desc}\n\n"));
        }
        out.push_str(&format!("`{}`\n\n", usage_line(command, root).trim_start_matches("Usage: ")));

        let arguments = node
            .arguments
            .iter()
            .map(|a| {
                let required = if a.required { "yes" } else { "no" };
                format!("| `{}` | {required} | {} |", a.name, describe(a))
            })
            .collect();
        push_table(&mut out, "Arguments", "| Argument | Required | Description |", arguments);
        push_table(
            &mut out,
            "Options",
            "| Option | Type | Description |",
            option_rows(&node.options),
        );
        if let Some(root) = root {
            push_table(
                &mut out,
                "Global Options",
                "| Option | Type | Description |",
                option_rows(&root.options),
            );
        }

        let commands = node
            .subcommands
            .iter()
            .map(|s| {
                format!(
                    "| `{}` | {} |",
                    command_label(s),
                    s.description.as_deref().unwrap_or("")
                )
            })
            .collect();
        push_table(&mut out, "Commands", "| Command | Description |", commands);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;

    fn tree() -> CommandNode {
        CommandNode::new("app")
            .with_description("Example app")
            .with_option(OptionSpec::boolean("help").with_short("h").with_description("Show help"))
            .with_subcommand(
                CommandNode::new("deploy")
                    .with_alias("d")
                    .with_description("Deploy a target")
                    .with_option(
                        OptionSpec::string("env")
                            .with_short("e")
                            .with_choices(["dev", "staging"])
                            .with_default("dev"),
                    )
                    .with_option(OptionSpec::array("tag"))
                    .with_argument(OptionSpec::string("target").required())
                    .with_argument(OptionSpec::array("extra")),
            )
    }

    #[test]
    fn test_plain_root_help() {
        let root = tree();
        let found = FoundCommand::new(&root);
        let help = PlainHelpFormatter.format_help(&found, None);

        assert!(help.starts_with("Usage: app [OPTIONS] <COMMAND>\n"));
        assert!(help.contains("Example app"));
        assert!(help.contains("-h, --help  Show help"));
        assert!(help.contains("deploy, d  Deploy a target"));
        assert!(!help.contains("Global Options"));
    }

    #[test]
    fn test_plain_subcommand_help() {
        let root = tree();
        let args = vec!["deploy".to_string()];
        let (found, _) = resolve(&root, &args);
        let help = PlainHelpFormatter.format_help(&found, Some(&root));

        assert!(help.starts_with("Usage: app deploy [OPTIONS] <target> [extra]...\n"));
        assert!(help.contains("-e, --env <env>"));
        assert!(help.contains("[choices: dev, staging] [default: dev]"));
        assert!(help.contains("--tag <tag>..."));
        assert!(help.contains("Global Options:"));
        assert!(help.contains("\nArguments:\n  <target>    [required]\n  [extra]...\n"));
    }

    #[test]
    fn test_markdown_help() {
        let root = tree();
        let args = vec!["d".to_string()];
        let (found, _) = resolve(&root, &args);
        let md = MarkdownHelpFormatter.format_help(&found, Some(&root));

        assert!(md.starts_with("# app d\n"));
        assert!(md.contains("## Arguments"));
        assert!(md.contains("| `target` | yes | [required] |"));
        assert!(md.contains("| `-e, --env <env>` | string |"));
        assert!(md.contains("## Global Options"));
        assert!(!md.contains("## Commands"));
    }
}
