//! Decaf semantic analysis CLI

use clap::{Parser, Subcommand};
use decaf::{CheckOptions, Program};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "decaf", version, about = "Decaf semantic analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type check a parsed program given as a JSON AST
    Check {
        /// JSON file holding the AST
        file: PathBuf,
        /// Decaf source the AST spans point into, for annotated reports
        #[arg(long)]
        source: Option<PathBuf>,
        /// Print the annotated AST as JSON after checking
        #[arg(long)]
        emit_ast: bool,
        /// Omit "did you mean" suggestions
        #[arg(long)]
        no_hints: bool,
    },
}

fn main() -> ExitCode {
    // DECAF_LOG takes an EnvFilter directive, e.g. `DECAF_LOG=decaf=debug`
    if let Ok(filter) = EnvFilter::try_from_env("DECAF_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check {
            file,
            source,
            emit_ast,
            no_hints,
        } => check_file(&file, source.as_deref(), emit_ast, !no_hints),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the program checked clean.
fn check_file(
    path: &Path,
    source: Option<&Path>,
    emit_ast: bool,
    hints: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let mut program: Program = serde_json::from_str(&json)?;

    let options = CheckOptions {
        hints,
        sort_diagnostics: true,
    };
    let analysis = decaf::analyze_with(&mut program, &options);

    match source {
        Some(source_path) => {
            let text = std::fs::read_to_string(source_path)?;
            let filename = source_path.display().to_string();
            for error in &analysis.diagnostics {
                decaf::error::report_error(&filename, &text, error)?;
            }
        }
        None => {
            for error in &analysis.diagnostics {
                println!("{error}");
                if let Some(hint) = &error.hint {
                    println!("    help: {hint}");
                }
            }
        }
    }

    if emit_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
    }

    let filename = path.display();
    if analysis.is_ok() {
        println!("✓ {filename} type checks successfully");
    } else {
        eprintln!("{filename}: {} semantic error(s)", analysis.diagnostics.len());
    }
    Ok(analysis.is_ok())
}
