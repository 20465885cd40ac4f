//! `closure` and `callable` command implementation

use anyhow::Result;
use cn_driver::{CanonConfig, CanonicalClosure, Canonicalizer, FunctionValue, Origin};
use cn_vfs::VirtualFileSystem;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// How results are printed
#[derive(Copy, Clone, Debug)]
pub struct Output {
    /// Print JSON instead of colored text
    pub json: bool,
}

/// Canonicalizes the value at `origin` in `path` and prints it
pub fn run(config: Option<&Path>, path: PathBuf, origin: Origin, output: Output) -> Result<()> {
    let config = match config {
        Some(file) => CanonConfig::from_file(file)?,
        None => CanonConfig::default(),
    };
    tracing::debug!(?config, "loaded configuration");

    let canonicalizer = Canonicalizer::new(VirtualFileSystem::new(), config);
    let value = FunctionValue { path, origin };

    match canonicalizer.canonicalize(&value) {
        Ok(closure) if output.json => {
            println!("{}", serde_json::to_string_pretty(&closure)?);
        }
        Ok(closure) => print_closure(&closure),
        Err(error) => {
            let kind = error.kind();
            eprintln!("{:?}", miette::Report::new(error));
            anyhow::bail!("canonicalization failed ({kind})");
        }
    }

    Ok(())
}

fn print_closure(closure: &CanonicalClosure) {
    println!("{}", closure.code());
    println!();
    println!("  {} {}", "Signature:".bold(), closure.source.signature);

    let traits = &closure.traits;
    let mut flags = Vec::new();
    if traits.is_static {
        flags.push("static");
    }
    if traits.is_arrow {
        flags.push("arrow");
    }
    if traits.uses_this {
        flags.push("$this");
    }
    if traits.uses_scope {
        flags.push("scope");
    }
    if !flags.is_empty() {
        println!("  {} {}", "Traits:".bold(), flags.join(", "));
    }
    if !traits.captures.is_empty() {
        println!("  {} {}", "Captures:".bold(), traits.captures.join(", "));
    }
    if let Some(dispatch) = closure.dispatch {
        println!("  {} {dispatch}", "Dispatch:".bold());
    }
    for name in &closure.unresolved {
        println!("  {} `{name}` anchored to the global scope", "Warning:".yellow().bold());
    }
}
