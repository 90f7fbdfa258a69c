//! # Callables
//!
//! The `Callable` trait is the capability interface shared by plain
//! functions, bound methods, and the validating wrappers built on top of
//! them: invoke, introspect name and documentation, and read or write
//! attributes. Wrappers forward each of these to the callable they hold.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::args::CallArguments;
use crate::error::{CallResult, EnsureError};
use crate::value::Value;

/// Anything that can be invoked with [`CallArguments`].
pub trait Callable: Send + Sync {
    /// Invoke with the given arguments.
    fn call(&self, args: CallArguments) -> CallResult;

    /// The `__name__` of the callable.
    fn name(&self) -> String;

    /// The `__doc__` of the callable.
    fn doc(&self) -> Option<String> {
        None
    }

    /// Printable identity, as used in error messages.
    fn repr(&self) -> String {
        format!("<function {}>", self.name())
    }

    /// Attribute read.
    fn get_attr(&self, name: &str) -> Option<Value> {
        match name {
            "__name__" => Some(Value::Str(self.name())),
            "__doc__" => Some(self.doc().map_or(Value::None, Value::Str)),
            _ => None,
        }
    }

    /// Attribute write. Callables without an attribute table refuse.
    fn set_attr(&self, name: &str, _value: Value) -> Result<(), EnsureError> {
        Err(EnsureError::Attribute {
            target: self.repr(),
            name: name.to_string(),
        })
    }
}

type NativeFn = dyn Fn(CallArguments) -> CallResult + Send + Sync;

/// A callable backed by a Rust closure, with a writable attribute table.
///
/// The table starts with `__name__`, `__qualname__`, `__doc__` and
/// `__module__`; `name()`, `doc()` and `repr()` read from it, so writes to
/// those attributes show up everywhere.
pub struct NativeFunction {
    func: Box<NativeFn>,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(CallArguments) -> CallResult + Send + Sync + 'static,
    {
        let name = name.into();
        let mut attrs = BTreeMap::new();
        attrs.insert("__name__".to_string(), Value::Str(name.clone()));
        attrs.insert("__qualname__".to_string(), Value::Str(name));
        attrs.insert("__doc__".to_string(), Value::None);
        attrs.insert("__module__".to_string(), Value::None);
        Self {
            func: Box::new(func),
            attrs: RwLock::new(attrs),
        }
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        self.with_attr("__doc__", Value::Str(doc.into()))
    }

    pub fn with_module(self, module: impl Into<String>) -> Self {
        self.with_attr("__module__", Value::Str(module.into()))
    }

    pub fn with_qualname(self, qualname: impl Into<String>) -> Self {
        self.with_attr("__qualname__", Value::Str(qualname.into()))
    }

    pub fn with_attr(self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.write().insert(name.into(), value);
        self
    }

    fn str_attr(&self, name: &str) -> Option<String> {
        self.attrs.read().get(name).and_then(Value::as_str).map(str::to_string)
    }
}

impl Callable for NativeFunction {
    fn call(&self, args: CallArguments) -> CallResult {
        (self.func)(args)
    }

    fn name(&self) -> String {
        self.str_attr("__name__").unwrap_or_else(|| "<anonymous>".to_string())
    }

    fn doc(&self) -> Option<String> {
        self.str_attr("__doc__")
    }

    fn repr(&self) -> String {
        let qualname = self.str_attr("__qualname__").unwrap_or_else(|| self.name());
        format!("<function {qualname}>")
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EnsureError> {
        self.attrs.write().insert(name.to_string(), value);
        Ok(())
    }
}

/// A callable with a fixed receiver supplied as positional argument 0.
#[derive(Clone)]
pub struct BoundMethod {
    receiver: Value,
    function: Arc<dyn Callable>,
}

impl BoundMethod {
    pub fn new(receiver: Value, function: Arc<dyn Callable>) -> Self {
        Self { receiver, function }
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn function(&self) -> &Arc<dyn Callable> {
        &self.function
    }
}

impl Callable for BoundMethod {
    fn call(&self, args: CallArguments) -> CallResult {
        self.function.call(args.with_receiver(self.receiver.clone()))
    }

    fn name(&self) -> String {
        self.function.name()
    }

    fn doc(&self) -> Option<String> {
        self.function.doc()
    }

    fn repr(&self) -> String {
        let qualname = self
            .function
            .get_attr("__qualname__")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| self.function.name());
        format!("<bound method {qualname} of {}>", self.receiver.repr())
    }

    /// `__self__` and `__func__` are answered here; everything else comes
    /// from the bound function.
    fn get_attr(&self, name: &str) -> Option<Value> {
        match name {
            "__self__" => Some(self.receiver.clone()),
            "__func__" => Some(Value::Callable(Arc::clone(&self.function))),
            _ => self.function.get_attr(name),
        }
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EnsureError> {
        self.function.set_attr(name, value)
    }
}

/// Attribute-access protocol for a function stored on a class: read
/// through the class (no instance) the function itself comes back, read
/// through an instance the bound form.
pub fn descriptor_get(function: Arc<dyn Callable>, instance: Option<Value>) -> Value {
    match instance {
        None => Value::Callable(function),
        Some(instance) => Value::callable(BoundMethod::new(instance, function)),
    }
}
