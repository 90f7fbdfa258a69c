//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types that cross the [`Callable`](crate::Callable)
//! boundary. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Design
//!
//! - Mismatch errors carry the printable identities of the target and the
//!   expected type, rendered once at the failure site. Catch sites never
//!   re-derive them.
//! - Configuration errors are fatal to the operation that detected them and
//!   are never retried.
//! - Failures raised by a target pass through unchanged.

use thiserror::Error;

/// Result type returned by every callable invocation.
pub type CallResult = Result<crate::Value, EnsureError>;

/// Top-level error type for argument and return-value validation.
#[derive(Error, Debug)]
pub enum EnsureError {
    /// The schema, an annotation, or a wrapper target is malformed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A resolved argument is not an instance of its declared type.
    #[error("Argument {argument} to {target} does not match annotation type {expected}")]
    TypeMismatch {
        /// Name of the offending parameter.
        argument: String,
        /// Printable identity of the target callable.
        target: String,
        /// Printable identity of the expected type.
        expected: String,
    },

    /// The value returned by a completed call is not an instance of the
    /// declared return type. The call itself already happened.
    #[error("Return value of {target} does not match annotation type {expected}")]
    ReturnMismatch {
        /// Printable identity of the target callable.
        target: String,
        /// Printable identity of the expected type.
        expected: String,
    },

    /// Attribute lookup failed.
    #[error("{target} has no attribute '{name}'")]
    Attribute {
        /// Printable identity of the object the lookup ran against.
        target: String,
        /// The missing attribute.
        name: String,
    },

    /// Failure signalled by the target itself.
    #[error(transparent)]
    Target(Box<dyn std::error::Error + Send + Sync>),
}

impl EnsureError {
    /// Wrap an arbitrary failure raised inside a target.
    pub fn target(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Target(err.into())
    }

    /// True for argument and return mismatches, the two outcomes a caller
    /// treats as "the call was rejected" rather than "the setup is broken".
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::ReturnMismatch { .. })
    }
}

/// Malformed schema, annotation, or target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The schema value is not a list or tuple of descriptors.
    #[error("schema must be a list of descriptors, found {found}")]
    SchemaNotSequence {
        /// Printable form of the offending value.
        found: String,
    },

    /// A schema entry is not a 3-element `(name, type, position)` tuple.
    #[error("descriptor {index} must be a tuple of length 3, found {found}")]
    MalformedDescriptor {
        /// Index of the entry in the schema.
        index: usize,
        /// Printable form of the offending entry.
        found: String,
    },

    /// A descriptor position is neither `None` nor a non-negative integer.
    #[error("position of parameter '{name}' must be None or a non-negative integer, found {found}")]
    InvalidPosition {
        /// Parameter name.
        name: String,
        /// Printable form of the offending position.
        found: String,
    },

    /// A parameter name is not usable as an identifier.
    #[error("parameter name {found} is not a valid identifier")]
    InvalidName {
        /// Printable form of the offending name.
        found: String,
    },

    /// An annotation resolved at check time is not a type.
    #[error("annotation for argument '{argument}' is not a type: {found}")]
    AnnotationNotAType {
        /// Parameter name.
        argument: String,
        /// Printable form of the annotation.
        found: String,
    },

    /// A return-checking wrapper was built without a return type.
    #[error("return annotation is required")]
    MissingReturnType,

    /// The declared return type is not a type.
    #[error("return annotation is not a type: {found}")]
    ReturnNotAType {
        /// Printable form of the annotation.
        found: String,
    },

    /// A wrapper target is not invocable.
    #[error("target is not callable: {found}")]
    NotCallable {
        /// Printable form of the offending value.
        found: String,
    },

    /// A type name could not be resolved.
    #[error("unknown type '{name}'")]
    UnknownType {
        /// The unresolved name.
        name: String,
    },

    /// A type name is already registered.
    #[error("type '{name}' is already defined")]
    DuplicateType {
        /// The clashing name.
        name: String,
    },

    /// Registering a virtual subclass would make the hierarchy cyclic.
    #[error("registering {subclass} under {base} would create a cycle")]
    SubtypeCycle {
        /// Printable identity of the would-be subclass.
        subclass: String,
        /// Printable identity of the would-be base.
        base: String,
    },

    /// A `__class__` entry in a JSON object is not a type name.
    #[error("__class__ must be a type name, found {found}")]
    InvalidClassTag {
        /// The offending JSON value.
        found: String,
    },

    /// An own field of a wrapper cannot be reassigned.
    #[error("attribute '{name}' is read-only")]
    ReadOnlyAttribute {
        /// The attribute name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_message_matches_reference_format() {
        let err = EnsureError::TypeMismatch {
            argument: "x".into(),
            target: "<function f>".into(),
            expected: "<class 'int'>".into(),
        };
        assert_eq!(
            err.to_string(),
            "Argument x to <function f> does not match annotation type <class 'int'>"
        );
        assert!(err.is_mismatch());
    }

    #[test]
    fn return_mismatch_message_matches_reference_format() {
        let err = EnsureError::ReturnMismatch {
            target: "<function f>".into(),
            expected: "<class 'str'>".into(),
        };
        assert_eq!(
            err.to_string(),
            "Return value of <function f> does not match annotation type <class 'str'>"
        );
    }

    #[test]
    fn target_failures_display_transparently() {
        let err = EnsureError::target("disk on fire");
        assert_eq!(err.to_string(), "disk on fire");
        assert!(!err.is_mismatch());
    }

    #[test]
    fn configuration_errors_convert() {
        let err: EnsureError = ConfigurationError::MissingReturnType.into();
        assert!(matches!(
            err,
            EnsureError::Configuration(ConfigurationError::MissingReturnType)
        ));
        assert_eq!(err.to_string(), "configuration error: return annotation is required");
    }
}
