//! `tokens` command implementation

use crate::canonicalize::Output;
use anyhow::{Context, Result};
use cn_lexer::SourceUnit;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// Prints the tokens of `path`, trivia only when asked
pub fn dump(path: &Path, trivia: bool, output: Output) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let unit = SourceUnit::new(path, Arc::from(text));

    let tokens: Vec<_> = unit
        .tokens
        .iter()
        .filter(|token| trivia || !token.is_trivia())
        .collect();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    for token in tokens {
        let line = unit.lines.line_of(token.span.start);
        println!(
            "{:>5} {:>6}..{:<6} {:<24} {:?}",
            line.to_string().dimmed(),
            token.span.start,
            token.span.end,
            format!("{:?}", token.kind).cyan(),
            token.text
        );
    }

    Ok(())
}
