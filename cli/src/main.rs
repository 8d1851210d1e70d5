use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_dispatch::{ArgvMode, Engine, Logger, MarkdownHelpFormatter, Outcome};
use command_dispatch_core::{CommandNode, load_tree, validate_tree};

/// Output format for parsed contexts.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "cmd-dispatch")]
#[command(about = "Check, parse and run invocations against a declared command tree")]
#[command(version, disable_help_subcommand = true)]
struct Cli {
    /// Print engine debug logging to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a declaration tree and report every declaration error.
    Check(CheckArgs),
    /// Resolve, parse and validate an argument vector; print the context.
    Parse(ParseArgs),
    /// Render help for a command in the tree.
    Help(HelpArgs),
    /// Dispatch an argument vector through the full pipeline.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration tree file (.json, .yaml or .yml).
    tree: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Declaration tree file (.json, .yaml or .yml).
    #[arg(long)]
    tree: PathBuf,
    /// The argument vector starts with a host runtime and a script path.
    #[arg(long)]
    host_runtime: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Full argument vector, program name first.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Declaration tree file (.json, .yaml or .yml).
    #[arg(long)]
    tree: PathBuf,
    /// Render Markdown instead of terminal text.
    #[arg(long)]
    markdown: bool,
    /// Command path below the root (names or aliases).
    path: Vec<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Declaration tree file (.json, .yaml or .yml).
    #[arg(long)]
    tree: PathBuf,
    /// The argument vector starts with a host runtime and a script path.
    #[arg(long)]
    host_runtime: bool,
    /// Give every command a handler that prints its parsed context.
    #[arg(long)]
    echo: bool,
    /// Full argument vector, program name first.
    #[arg(last = true)]
    argv: Vec<String>,
}

/// Engine logger writing to stderr. Debug and info lines only appear with
/// `--verbose`; help and version text is printed from the outcome instead.
struct StderrLogger {
    verbose: bool,
}

impl Logger for StderrLogger {
    fn info(&self, message: &str) {
        if self.verbose {
            eprintln!("[info] {message}");
        }
    }

    fn error(&self, message: &str) {
        if self.verbose {
            eprintln!("[error] {message}");
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            eprintln!("[debug] {message}");
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Parse(args) => run_parse(args, verbose),
        Command::Help(args) => run_help(args, verbose),
        Command::Run(args) => run_dispatch(args, verbose),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let tree = read_tree(&args.tree)?;
    let errors = validate_tree(&tree);

    if errors.is_empty() {
        println!(
            "'{}' is valid: {} command(s).",
            args.tree.display(),
            count_commands(&tree)
        );
        return Ok(());
    }

    for err in &errors {
        eprintln!("  {err}");
    }
    Err(format!(
        "{} declaration error(s) in '{}'",
        errors.len(),
        args.tree.display()
    ))
}

fn run_parse(args: ParseArgs, verbose: bool) -> Result<(), String> {
    let engine = build_engine(read_tree(&args.tree)?, args.host_runtime, verbose)?;
    let tokens = engine.user_tokens(args.argv);
    let ctx = engine.parse(&tokens).map_err(|err| err.to_string())?;
    let snapshot = ctx.to_json();

    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&snapshot)
            .map_err(|err| format!("Failed to serialize context: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&snapshot)
            .map_err(|err| format!("Failed to serialize context: {err}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_help(args: HelpArgs, verbose: bool) -> Result<(), String> {
    let builder = Engine::builder(read_tree(&args.tree)?).logger(StderrLogger { verbose });
    let builder = if args.markdown {
        builder.help_formatter(MarkdownHelpFormatter)
    } else {
        builder
    };
    let engine = builder
        .build()
        .map_err(|err| format!("Invalid declaration tree: {err}"))?;

    let text = engine
        .render_help(&args.path)
        .ok_or_else(|| format!("no command at path '{}'", args.path.join(" ")))?;
    print!("{text}");
    Ok(())
}

fn run_dispatch(args: RunArgs, verbose: bool) -> Result<(), String> {
    let mut tree = read_tree(&args.tree)?;
    if args.echo {
        attach_echo_handlers(&mut tree);
    }

    let engine = build_engine(tree, args.host_runtime, verbose)?;
    match engine.start(args.argv).map_err(|err| err.to_string())? {
        Outcome::Executed => {}
        Outcome::Version(version) => println!("{version}"),
        Outcome::Help(text) => print!("{text}"),
    }
    Ok(())
}

fn read_tree(path: &Path) -> Result<CommandNode, String> {
    load_tree(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn build_engine(tree: CommandNode, host_runtime: bool, verbose: bool) -> Result<Engine, String> {
    let mode = if host_runtime {
        ArgvMode::HostRuntime
    } else {
        ArgvMode::Standard
    };
    Engine::builder(tree)
        .logger(StderrLogger { verbose })
        .argv_mode(mode)
        .build()
        .map_err(|err| format!("Invalid declaration tree: {err}"))
}

/// Gives every node without a handler one that prints its context as JSON.
fn attach_echo_handlers(node: &mut CommandNode) {
    if node.execute.is_none() {
        let echoed = std::mem::take(node).with_handler(|ctx| {
            println!("{}", serde_json::to_string_pretty(&ctx.to_json())?);
            Ok(())
        });
        *node = echoed;
    }
    for sub in &mut node.subcommands {
        attach_echo_handlers(sub);
    }
}

fn count_commands(node: &CommandNode) -> usize {
    1 + node.subcommands.iter().map(count_commands).sum::<usize>()
}
