//! # Schema Documents
//!
//! Loads schemas from JSON or YAML documents and resolves them against a
//! [`TypeRegistry`]:
//!
//! ```yaml
//! target: adopt
//! types:
//!   - name: Animal
//!     module: zoo
//!   - name: Dog
//!     module: zoo
//!     bases: [Animal]
//! parameters:
//!   - { name: pet, type: Animal, position: 0 }
//!   - { name: age, type: int, position: 1 }
//!   - { name: note, type: str }
//! returns: bool
//! ```
//!
//! Types are declared in order, so a base must appear before the classes
//! deriving from it. `virtual_bases` registers the declared class as a
//! virtual subclass of each named type; registering under a builtin such as
//! `Number` is process-wide.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ensure_core::{ConfigurationError, TypeRef, TypeRegistry};

use crate::descriptor::{ParameterDescriptor, Schema};

/// Error loading or resolving a schema document.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The document file could not be read.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The document is not valid JSON/YAML for this format.
    #[error("schema document parse error: {reason}")]
    Parse {
        /// Parser message.
        reason: String,
    },

    /// A parameter names a type the registry does not know.
    #[error("parameter '{parameter}' names unknown type '{type_name}'")]
    UnknownParameterType {
        /// Parameter name.
        parameter: String,
        /// The unresolved type name.
        type_name: String,
    },

    /// The return annotation names a type the registry does not know.
    #[error("return annotation names unknown type '{type_name}'")]
    UnknownReturnType {
        /// The unresolved type name.
        type_name: String,
    },

    /// Declaring types or descriptors failed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// On-disk form of a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Name of the function the schema describes.
    #[serde(default)]
    pub target: Option<String>,
    /// Classes to declare before resolving parameters.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    /// Checked parameters, in schema order.
    #[serde(default)]
    pub parameters: Vec<ParameterEntry>,
    /// Declared return type, by name.
    #[serde(default)]
    pub returns: Option<String>,
}

/// A class declared by a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub virtual_bases: Vec<String>,
}

/// A parameter descriptor by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub position: Option<usize>,
}

/// A document resolved into typed form.
#[derive(Clone)]
pub struct ResolvedSchema {
    pub target: Option<String>,
    pub schema: Schema,
    pub return_type: Option<TypeRef>,
    /// The registry after the document's classes were declared.
    pub registry: TypeRegistry,
}

/// True when `path` names a JSON document (`.json`, any case). Everything
/// else is read as YAML.
pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl SchemaDocument {
    pub fn from_json_str(source: &str) -> Result<Self, SchemaLoadError> {
        serde_json::from_str(source).map_err(|e| SchemaLoadError::Parse {
            reason: e.to_string(),
        })
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, SchemaLoadError> {
        serde_yaml::from_str(source).map_err(|e| SchemaLoadError::Parse {
            reason: e.to_string(),
        })
    }

    /// Load from disk. `.json` files parse as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, SchemaLoadError> {
        let source = std::fs::read_to_string(path).map_err(|e| SchemaLoadError::DocumentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if is_json_path(path) {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Declare the document's classes in `registry` and resolve every type
    /// name.
    pub fn resolve(&self, mut registry: TypeRegistry) -> Result<ResolvedSchema, SchemaLoadError> {
        for decl in &self.types {
            let bases: Vec<&str> = decl.bases.iter().map(String::as_str).collect();
            let class = registry.declare_class(&decl.name, decl.module.as_deref(), &bases)?;
            for base in &decl.virtual_bases {
                registry.resolve(base)?.register_virtual_subclass(&class)?;
            }
        }

        let descriptors = self
            .parameters
            .iter()
            .map(|entry| -> Result<ParameterDescriptor, SchemaLoadError> {
                let ty = registry.get(&entry.type_name).ok_or_else(|| {
                    SchemaLoadError::UnknownParameterType {
                        parameter: entry.name.clone(),
                        type_name: entry.type_name.clone(),
                    }
                })?;
                Ok(ParameterDescriptor::new(&entry.name, ty, entry.position)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let return_type = match &self.returns {
            Some(name) => Some(registry.get(name).cloned().ok_or_else(|| {
                SchemaLoadError::UnknownReturnType {
                    type_name: name.clone(),
                }
            })?),
            None => None,
        };

        tracing::debug!(
            parameters = descriptors.len(),
            declared_types = self.types.len(),
            has_return_type = return_type.is_some(),
            "resolved schema document"
        );

        Ok(ResolvedSchema {
            target: self.target.clone(),
            schema: Schema::new(descriptors),
            return_type,
            registry,
        })
    }
}
