use clap::Parser;
use lispy::evaluator::{self, EnvRef};
use lispy::{parser, reader};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Interactive session for the lispy evaluator
#[derive(Debug, Parser)]
#[command(name = "lispy", version, about)]
struct Config {
    /// Prompt shown before each line
    #[arg(long, default_value = "lispy> ")]
    prompt: String,

    /// Print the parse tree of each input as JSON before evaluating it
    #[arg(long)]
    show_ast: bool,

    /// File to load line history from and save it to on exit
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Source files evaluated in order before the interactive loop starts
    files: Vec<PathBuf>,
}

fn main() -> rustyline::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::parse();
    let env = evaluator::create_global_env();

    for path in &config.files {
        load_file(&env, path);
    }

    println!("Lispy v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, or Ctrl+D to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;
    if let Some(path) = &config.history {
        // A missing history file is normal on first run
        if rl.load_history(path).is_err() {
            tracing::debug!(path = %path.display(), "no history loaded");
        }
    }

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add the line to history
                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":ast" => {
                        config.show_ast = !config.show_ast;
                        println!(
                            "Parse tree display {}",
                            if config.show_ast { "enabled" } else { "disabled" }
                        );
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                eval_line(&env, line, config.show_ast);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Use Ctrl+D or :quit to exit.");
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = &config.history {
        rl.save_history(path)?;
    }
    Ok(())
}

/// Evaluate one line as a single S-expression and print the result
fn eval_line(env: &EnvRef, line: &str, show_ast: bool) {
    match parser::parse(line) {
        Ok(tree) => {
            if show_ast {
                println!("{}", tree.to_json());
            }
            let result = evaluator::eval(env, reader::read(&tree));
            println!("{}", result);
        }
        Err(e) => println!("Error: {}", e),
    }
}

/// Evaluate every parenthesised top-level form of a file, printing each result
fn load_file(env: &EnvRef, path: &Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            println!("Error: could not load {}: {}", path.display(), e);
            return;
        }
    };

    tracing::info!(path = %path.display(), "loading file");
    match lispy::eval_source(env, &source) {
        Ok(results) => {
            for result in results {
                println!("{}", result);
            }
        }
        Err(e) => println!("Error: {}: {}", path.display(), e),
    }
}

fn print_help() {
    println!("Lispy Commands:");
    println!("  :help    - Show this help message");
    println!("  :env     - Show global bindings");
    println!("  :ast     - Toggle parse tree display");
    println!("  :quit    - Exit the interpreter");
    println!("  :exit    - Exit the interpreter");
    println!();
    println!("Values:");
    println!("  Numbers: 42, -5");
    println!("  Strings: \"hello world\"");
    println!("  S-expressions: (+ 1 2)   evaluated");
    println!("  Q-expressions: {{1 2 3}}  left as data");
    println!();
    println!("Builtins:");
    println!("  Lists: list, head, tail, join, eval");
    println!("  Arithmetic: + - * /");
    println!("  Comparison: > < >= <= == !=");
    println!("  Definitions: def (global), = (local), \\ (lambda)");
    println!("  Control: if");
    println!("  Other: error, print");
    println!();
    println!("Examples:");
    println!("  + 1 2 3");
    println!("  def {{x}} 42");
    println!("  def {{add}} (\\ {{a b}} {{+ a b}})");
    println!("  def {{inc}} (add 1)");
    println!("  inc 41");
    println!("  if (> x 0) {{head {{1 2}}}} {{tail {{1 2}}}}");
}

fn print_environment(env: &EnvRef) {
    for (name, value) in env.borrow().bindings() {
        println!("  {} = {}", name, value);
    }
}
