//! # Parameter Descriptors and Schemas
//!
//! A `Schema` is the ordered list of `(name, annotation, position)`
//! descriptors that drives argument validation. Order only decides which
//! failure is reported first; matching is always by explicit position or by
//! name.
//!
//! ## Annotations Are Values
//!
//! A descriptor stores its annotation as a [`Value`]. Construction only
//! checks the descriptor's *shape*; whether the annotation is actually a
//! type is answered by [`ParameterDescriptor::expected_type`] when a value is
//! resolved for the parameter, and a non-type annotation fails there with a
//! configuration error instead of being skipped.

use std::sync::Arc;

use ensure_core::{ConfigurationError, TypeRef, Value};

/// One checked parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    annotation: Value,
    position: Option<usize>,
}

impl ParameterDescriptor {
    /// Build a descriptor. Fails with `InvalidName` when `name` is not an
    /// identifier and with `InvalidPosition` when `position` does not fit
    /// the dynamic integer form.
    pub fn new(
        name: impl Into<String>,
        annotation: impl Into<Value>,
        position: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(ConfigurationError::InvalidName {
                found: Value::Str(name).repr(),
            });
        }
        if let Some(p) = position {
            if i64::try_from(p).is_err() {
                return Err(ConfigurationError::InvalidPosition {
                    name,
                    found: p.to_string(),
                });
            }
        }
        Ok(Self {
            name,
            annotation: annotation.into(),
            position,
        })
    }

    /// A parameter that may arrive at `position` or by keyword.
    pub fn positional(
        name: impl Into<String>,
        ty: &TypeRef,
        position: usize,
    ) -> Result<Self, ConfigurationError> {
        Self::new(name, ty, Some(position))
    }

    /// A parameter checked only when passed by keyword.
    pub fn keyword(name: impl Into<String>, ty: &TypeRef) -> Result<Self, ConfigurationError> {
        Self::new(name, ty, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> &Value {
        &self.annotation
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The annotation as a type, or `AnnotationNotAType`.
    pub fn expected_type(&self) -> Result<&TypeRef, ConfigurationError> {
        self.annotation
            .as_type()
            .ok_or_else(|| ConfigurationError::AnnotationNotAType {
                argument: self.name.clone(),
                found: self.annotation.repr(),
            })
    }

    /// The dynamic `(name, annotation, position)` triple.
    pub fn to_value(&self) -> Value {
        Value::Tuple(vec![
            Value::Str(self.name.clone()),
            self.annotation.clone(),
            self.position
                .and_then(|p| i64::try_from(p).ok())
                .map_or(Value::None, Value::Int),
        ])
    }

    fn from_entry(index: usize, entry: &Value) -> Result<Self, ConfigurationError> {
        let parts = match entry {
            Value::Tuple(parts) | Value::List(parts) if parts.len() == 3 => parts,
            other => {
                return Err(ConfigurationError::MalformedDescriptor {
                    index,
                    found: other.repr(),
                })
            }
        };
        let name = parts[0]
            .as_str()
            .ok_or_else(|| ConfigurationError::InvalidName {
                found: parts[0].repr(),
            })?;
        let position = match &parts[2] {
            Value::None => None,
            Value::Int(p) => Some(usize::try_from(*p).map_err(|_| {
                ConfigurationError::InvalidPosition {
                    name: name.to_string(),
                    found: parts[2].repr(),
                }
            })?),
            other => {
                return Err(ConfigurationError::InvalidPosition {
                    name: name.to_string(),
                    found: other.repr(),
                })
            }
        };
        Self::new(name, parts[1].clone(), position)
    }
}

/// ASCII identifier: a letter or `_`, then letters, digits, `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Ordered sequence of parameter descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    descriptors: Vec<ParameterDescriptor>,
}

impl Schema {
    pub fn new(descriptors: Vec<ParameterDescriptor>) -> Self {
        Self { descriptors }
    }

    /// A schema that checks nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the dynamic form: a list or tuple of 3-element tuples
    /// `(str, annotation, None | int >= 0)`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        let entries = match value {
            Value::List(entries) | Value::Tuple(entries) => entries,
            other => {
                return Err(ConfigurationError::SchemaNotSequence {
                    found: other.repr(),
                })
            }
        };
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ParameterDescriptor::from_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// The dynamic form, a list of triples.
    pub fn to_value(&self) -> Value {
        Value::List(self.descriptors.iter().map(ParameterDescriptor::to_value).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ParameterDescriptor> {
        self.descriptors.get(index)
    }

    /// First descriptor with the given name.
    pub fn find(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Share this schema across wrappers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl FromIterator<ParameterDescriptor> for Schema {
    fn from_iter<I: IntoIterator<Item = ParameterDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a ParameterDescriptor;
    type IntoIter = std::slice::Iter<'a, ParameterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
