//! # Describe Subcommand
//!
//! Prints a schema document after resolution, one descriptor per line, so
//! type names can be checked against what the registry actually bound.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use ensure_schema::ResolvedSchema;

use crate::{load_schema, EXIT_CONFIG, EXIT_OK};

/// Arguments for the `ensure describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema document (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
}

/// Render a resolved schema as text.
pub fn render(resolved: &ResolvedSchema) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "target: {}\n",
        resolved.target.as_deref().unwrap_or("<unnamed>")
    ));
    out.push_str(&format!("parameters: {}\n", resolved.schema.len()));
    for descriptor in &resolved.schema {
        let position = match descriptor.position() {
            Some(position) => format!("position {position}"),
            None => "keyword only".to_string(),
        };
        out.push_str(&format!(
            "  {}: {} ({position})\n",
            descriptor.name(),
            descriptor.annotation().repr()
        ));
    }
    if let Some(return_type) = &resolved.return_type {
        out.push_str(&format!("returns: {}\n", return_type.repr()));
    }
    out
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs) -> Result<u8> {
    match load_schema(&args.schema) {
        Ok(resolved) => {
            print!("{}", render(&resolved));
            Ok(EXIT_OK)
        }
        Err(e) => {
            println!("ERROR: {e:#}");
            Ok(EXIT_CONFIG)
        }
    }
}
