//! # Check Subcommand
//!
//! Replays one call through a validating wrapper built from a schema
//! document. The call document supplies the arguments and, optionally, the
//! value the target returns:
//!
//! ```json
//! {
//!   "args": [{"__class__": "Dog", "name": "Rex"}, 3],
//!   "kwargs": {"note": "good boy"},
//!   "result": true
//! }
//! ```
//!
//! Objects with a `__class__` key become instances of the named class as
//! declared by the schema document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use ensure_call::{CallableWrapper, ReturnCheckingWrapper};
use ensure_core::{CallArguments, Callable, NativeFunction, TypeRegistry, Value};
use ensure_schema::is_json_path;

use crate::{load_schema, EXIT_CONFIG, EXIT_MISMATCH, EXIT_OK};

/// Arguments for the `ensure check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Call document with `args`, `kwargs` and an optional `result`.
    #[arg(long, value_name = "FILE")]
    pub call: PathBuf,
}

/// A recorded call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallDocument {
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, serde_json::Value>,
    /// What the target returns. Absent means `None`.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl CallDocument {
    /// Load from disk. `.json` files parse as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read call document {}", path.display()))?;
        let document = if is_json_path(path) {
            serde_json::from_str(&source).context("call document is not valid JSON")?
        } else {
            serde_yaml::from_str(&source).context("call document is not valid YAML")?
        };
        Ok(document)
    }

    /// Convert the recorded arguments, resolving `__class__` names against
    /// `registry`.
    pub fn arguments(&self, registry: &TypeRegistry) -> Result<CallArguments> {
        let mut args = CallArguments::new();
        for item in &self.args {
            args.positional.push(Value::from_json(item, registry)?);
        }
        for (name, item) in &self.kwargs {
            args.keyword
                .insert(name.clone(), Value::from_json(item, registry)?);
        }
        Ok(args)
    }

    pub fn result(&self, registry: &TypeRegistry) -> Result<Value> {
        match &self.result {
            Some(json) => Ok(Value::from_json(json, registry)?),
            None => Ok(Value::None),
        }
    }
}

/// A target that logs what it was called with and returns `result`.
fn recording_target(name: &str, result: Value) -> NativeFunction {
    NativeFunction::new(name, move |args: CallArguments| {
        tracing::info!(
            positional = args.positional.len(),
            keyword = args.keyword.len(),
            "target invoked"
        );
        for (index, value) in args.positional.iter().enumerate() {
            tracing::debug!(index, value = %value.repr(), "positional argument");
        }
        for (name, value) in &args.keyword {
            tracing::debug!(name = %name, value = %value.repr(), "keyword argument");
        }
        Ok(result.clone())
    })
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the call passes, 1 on a mismatch, 2 when the
/// input documents are unusable.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let prepared = load_schema(&args.schema).and_then(|resolved| {
        let call = CallDocument::load(&args.call)?;
        let arguments = call
            .arguments(&resolved.registry)
            .context("invalid call arguments")?;
        let result = call
            .result(&resolved.registry)
            .context("invalid call result")?;
        Ok((resolved, arguments, result))
    });
    let (resolved, arguments, result) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            println!("ERROR: {e:#}");
            return Ok(EXIT_CONFIG);
        }
    };

    let name = resolved.target.as_deref().unwrap_or("target");
    let target: Arc<dyn Callable> = Arc::new(recording_target(name, result));
    let outcome = match resolved.return_type {
        Some(return_type) => {
            ReturnCheckingWrapper::new(resolved.schema, target, return_type).call(arguments)
        }
        None => CallableWrapper::new(resolved.schema, target).call(arguments),
    };

    match outcome {
        Ok(value) => {
            tracing::info!(result = %value.repr(), "call passed");
            println!("OK");
            Ok(EXIT_OK)
        }
        Err(e) if e.is_mismatch() => {
            println!("FAIL: {e}");
            Ok(EXIT_MISMATCH)
        }
        Err(e) => {
            println!("ERROR: {e}");
            Ok(EXIT_CONFIG)
        }
    }
}
