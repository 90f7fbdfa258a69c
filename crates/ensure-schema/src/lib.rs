//! # ensure-schema: Parameter Schemas
//!
//! Defines the schema that drives argument validation and the document
//! format schemas can be loaded from.
//!
//! ## Descriptors (`descriptor`)
//!
//! A [`Schema`] is an ordered list of [`ParameterDescriptor`]s, each a
//! `(name, annotation, position)` triple. Schemas are built in code, or
//! parsed from their dynamic form with [`Schema::from_value`], which
//! rejects anything that is not a sequence of well-formed triples.
//!
//! ## Documents (`document`)
//!
//! [`SchemaDocument`] is the JSON/YAML form: class declarations, parameters
//! by type name, and an optional return type, resolved against a
//! `TypeRegistry` into a [`ResolvedSchema`].
//!
//! ## Crate Policy
//!
//! - Depends only on `ensure-core` internally.
//! - Shape errors are reported at construction; whether an annotation is a
//!   type is decided when a value is checked against it.

pub mod descriptor;
pub mod document;

pub use descriptor::{is_identifier, ParameterDescriptor, Schema};
pub use document::{
    is_json_path, ParameterEntry, ResolvedSchema, SchemaDocument, SchemaLoadError, TypeDeclaration,
};
