//! # ensure-cli: Command-Line Front End
//!
//! Provides the `ensure` binary for exercising schemas without writing Rust:
//!
//! ```bash
//! ensure check --schema adopt.yaml --call call.json
//! ensure describe --schema adopt.yaml
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: the call passed every check.
//! - `1`: an argument or the return value did not match its annotation.
//! - `2`: the schema or call document could not be loaded or resolved.

pub mod check;
pub mod describe;

use std::path::Path;

use anyhow::{Context, Result};

use ensure_core::TypeRegistry;
use ensure_schema::{ResolvedSchema, SchemaDocument};

/// Exit code for a call that passed.
pub const EXIT_OK: u8 = 0;
/// Exit code for an argument or return mismatch.
pub const EXIT_MISMATCH: u8 = 1;
/// Exit code for unreadable or invalid input documents.
pub const EXIT_CONFIG: u8 = 2;

/// Load a schema document and resolve it against a fresh registry.
pub fn load_schema(path: &Path) -> Result<ResolvedSchema> {
    let document = SchemaDocument::load(path)
        .with_context(|| format!("failed to load schema document {}", path.display()))?;
    let resolved = document
        .resolve(TypeRegistry::new())
        .with_context(|| format!("failed to resolve schema document {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        parameters = resolved.schema.len(),
        "loaded schema"
    );
    Ok(resolved)
}
