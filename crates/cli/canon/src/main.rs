//! Closure canonicalizer CLI
//!
//! Prints the canonical source of a closure or callable reference found in a
//! PHP file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod canonicalize;
mod tokens;

#[derive(Parser)]
#[command(name = "canon")]
#[command(about = "Canonical source for PHP closures", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize the closure or arrow function starting on a line
    Closure {
        /// Source file
        path: PathBuf,

        /// 1-based line of the `function` or `fn` keyword
        #[arg(long)]
        line: u32,

        /// 1-based line of the closure's last token
        #[arg(long)]
        end_line: Option<u32>,

        /// 1-based column where the closure starts
        #[arg(long)]
        column: Option<u32>,
    },

    /// Canonicalize a first-class callable reference
    Callable {
        /// Source file
        path: PathBuf,

        /// Method or function name
        #[arg(long)]
        member: String,

        /// Declaring class, interface, trait or enum
        #[arg(long)]
        owner: Option<String>,

        /// The reference was taken statically
        #[arg(long = "static")]
        is_static: bool,

        /// The runtime reports the member as final
        #[arg(long = "final")]
        is_final: bool,
    },

    /// Dump the token stream of a file
    Tokens {
        /// Source file
        path: PathBuf,

        /// Include whitespace and comments
        #[arg(long)]
        trivia: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = canonicalize::Output { json: cli.json };
    match cli.command {
        Commands::Closure {
            path,
            line,
            end_line,
            column,
        } => {
            let origin = cn_driver::ClosureOrigin {
                line,
                end_line,
                column,
            };
            canonicalize::run(cli.config.as_deref(), path, origin.into(), output)?;
        }
        Commands::Callable {
            path,
            member,
            owner,
            is_static,
            is_final,
        } => {
            let reference = cn_driver::CallableReference {
                owner,
                member,
                is_static,
                is_final,
            };
            canonicalize::run(cli.config.as_deref(), path, reference.into(), output)?;
        }
        Commands::Tokens { path, trivia } => {
            tokens::dump(&path, trivia, output)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}
