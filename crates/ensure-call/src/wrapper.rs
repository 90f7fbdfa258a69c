//! # Validating Wrapper
//!
//! `CallableWrapper` pairs a schema with a target and is itself a
//! [`Callable`]: every invocation validates the arguments and then calls the
//! target. Everything else (name, doc, printable form, attributes) is the
//! target's, so a wrapper can stand in wherever the target was used.
//!
//! ## Own Fields
//!
//! `schema` and `target` are the only attributes answered by the wrapper
//! itself. They are read-only; writing them fails with
//! `ReadOnlyAttribute`. All other reads and writes go to the target.
//!
//! ## Method Binding
//!
//! [`CallableWrapper::bind`] produces a [`BoundMethod`] that prepends the
//! receiver and then calls the wrapper, so the receiver is validated like
//! any other positional argument.

use std::fmt;
use std::sync::Arc;

use ensure_core::{
    BoundMethod, CallArguments, CallResult, Callable, ConfigurationError, EnsureError, Value,
};
use ensure_schema::Schema;

use crate::validate::validate_and_call;

/// Attribute names answered by the wrapper instead of the target.
pub const WRAPPER_FIELDS: [&str; 2] = ["schema", "target"];

/// A callable that validates its arguments before delegating to a target.
#[derive(Clone)]
pub struct CallableWrapper {
    schema: Arc<Schema>,
    target: Arc<dyn Callable>,
}

impl CallableWrapper {
    pub fn new(schema: impl Into<Arc<Schema>>, target: Arc<dyn Callable>) -> Self {
        let schema = schema.into();
        tracing::debug!(callable = %target.repr(), checked = schema.len(), "wrapped callable");
        Self { schema, target }
    }

    /// Build from dynamic values. The schema must be a sequence of
    /// `(name, annotation, position)` triples and the target a callable.
    pub fn from_values(schema: &Value, target: &Value) -> Result<Self, EnsureError> {
        let schema = Schema::from_value(schema)?;
        let target = target
            .as_callable()
            .cloned()
            .ok_or_else(|| ConfigurationError::NotCallable {
                found: target.repr(),
            })?;
        Ok(Self::new(schema, target))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn target(&self) -> &Arc<dyn Callable> {
        &self.target
    }

    /// Validate, then call the target.
    pub fn invoke(&self, args: CallArguments) -> CallResult {
        validate_and_call(args, &self.schema, self.target.as_ref())
    }

    /// Bind to `instance` as an instance method.
    pub fn bind(self: &Arc<Self>, instance: Value) -> BoundMethod {
        BoundMethod::new(instance, Arc::clone(self) as Arc<dyn Callable>)
    }

    /// Attribute-access protocol: accessed through a class (no instance)
    /// the wrapper itself comes back, through an instance the bound form.
    pub fn descriptor_get(self: &Arc<Self>, instance: Option<Value>) -> Value {
        ensure_core::descriptor_get(Arc::clone(self) as Arc<dyn Callable>, instance)
    }

    pub fn into_value(self) -> Value {
        Value::callable(self)
    }
}

impl Callable for CallableWrapper {
    fn call(&self, args: CallArguments) -> CallResult {
        self.invoke(args)
    }

    fn name(&self) -> String {
        self.target.name()
    }

    fn doc(&self) -> Option<String> {
        self.target.doc()
    }

    fn repr(&self) -> String {
        self.target.repr()
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        match name {
            "schema" => Some(self.schema.to_value()),
            "target" => Some(Value::Callable(Arc::clone(&self.target))),
            _ => self.target.get_attr(name),
        }
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EnsureError> {
        if WRAPPER_FIELDS.contains(&name) {
            return Err(ConfigurationError::ReadOnlyAttribute {
                name: name.to_string(),
            }
            .into());
        }
        self.target.set_attr(name, value)
    }
}

impl fmt::Display for CallableWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target.repr())
    }
}

impl fmt::Debug for CallableWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target.repr())
    }
}
