//! # Return-Checking Wrapper
//!
//! `ReturnCheckingWrapper` composes a [`CallableWrapper`] with a declared
//! return type. Arguments are validated and the target is called exactly as
//! for the inner wrapper; the result is then checked against the return
//! type. A mismatching result is withheld, but the call has already run and
//! its side effects stand.

use std::fmt;
use std::sync::Arc;

use ensure_core::{
    BoundMethod, CallArguments, CallResult, Callable, ConfigurationError, EnsureError, TypeRef,
    Value,
};
use ensure_schema::Schema;

use crate::validate::check_return;
use crate::wrapper::CallableWrapper;

/// A validating wrapper that also checks the returned value.
#[derive(Clone)]
pub struct ReturnCheckingWrapper {
    inner: CallableWrapper,
    return_type: TypeRef,
}

impl ReturnCheckingWrapper {
    pub fn new(
        schema: impl Into<Arc<Schema>>,
        target: Arc<dyn Callable>,
        return_type: TypeRef,
    ) -> Self {
        Self::wrap(CallableWrapper::new(schema, target), return_type)
    }

    /// Add return checking on top of an existing argument-checking wrapper.
    pub fn wrap(inner: CallableWrapper, return_type: TypeRef) -> Self {
        tracing::debug!(
            callable = %inner.target().repr(),
            returns = %return_type.repr(),
            "added return check"
        );
        Self { inner, return_type }
    }

    /// Build from dynamic values. The return type is mandatory and must be a
    /// type; schema and target are checked first.
    pub fn from_values(
        schema: &Value,
        target: &Value,
        return_type: Option<&Value>,
    ) -> Result<Self, EnsureError> {
        let inner = CallableWrapper::from_values(schema, target)?;
        let annotation = return_type.ok_or(ConfigurationError::MissingReturnType)?;
        let return_type = annotation
            .as_type()
            .cloned()
            .ok_or_else(|| ConfigurationError::ReturnNotAType {
                found: annotation.repr(),
            })?;
        Ok(Self::wrap(inner, return_type))
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn as_wrapper(&self) -> &CallableWrapper {
        &self.inner
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.inner.schema()
    }

    pub fn target(&self) -> &Arc<dyn Callable> {
        self.inner.target()
    }

    /// Validate arguments, call, then validate the result.
    pub fn invoke(&self, args: CallArguments) -> CallResult {
        let result = self.inner.invoke(args)?;
        check_return(&result, &self.return_type, self.inner.target().as_ref())?;
        Ok(result)
    }

    pub fn bind(self: &Arc<Self>, instance: Value) -> BoundMethod {
        BoundMethod::new(instance, Arc::clone(self) as Arc<dyn Callable>)
    }

    pub fn descriptor_get(self: &Arc<Self>, instance: Option<Value>) -> Value {
        ensure_core::descriptor_get(Arc::clone(self) as Arc<dyn Callable>, instance)
    }

    pub fn into_value(self) -> Value {
        Value::callable(self)
    }
}

impl AsRef<CallableWrapper> for ReturnCheckingWrapper {
    fn as_ref(&self) -> &CallableWrapper {
        &self.inner
    }
}

impl Callable for ReturnCheckingWrapper {
    fn call(&self, args: CallArguments) -> CallResult {
        self.invoke(args)
    }

    fn name(&self) -> String {
        self.inner.name()
    }

    fn doc(&self) -> Option<String> {
        self.inner.doc()
    }

    fn repr(&self) -> String {
        self.inner.repr()
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        match name {
            "return_type" => Some(Value::Type(self.return_type.clone())),
            _ => self.inner.get_attr(name),
        }
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EnsureError> {
        if name == "return_type" {
            return Err(ConfigurationError::ReadOnlyAttribute {
                name: name.to_string(),
            }
            .into());
        }
        self.inner.set_attr(name, value)
    }
}

impl fmt::Display for ReturnCheckingWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for ReturnCheckingWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ensure_core::{builtins, NativeFunction};
    use ensure_schema::ParameterDescriptor;

    fn stringify(calls: Arc<AtomicUsize>, returns: Value) -> Arc<dyn Callable> {
        Arc::new(NativeFunction::new("stringify", move |_args: CallArguments| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(returns.clone())
        }))
    }

    fn schema() -> Schema {
        Schema::new(vec![ParameterDescriptor::positional("n", &builtins().int, 0).unwrap()])
    }

    #[test]
    fn matching_result_is_returned_unchanged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let wrapper = ReturnCheckingWrapper::new(
            schema(),
            stringify(calls.clone(), Value::from("7")),
            builtins().str.clone(),
        );
        let result = wrapper.call(CallArguments::positional([Value::from(7)])).unwrap();
        assert_eq!(result, Value::from("7"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mismatching_result_is_rejected_after_the_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let wrapper = ReturnCheckingWrapper::new(
            schema(),
            stringify(calls.clone(), Value::from(7)),
            builtins().str.clone(),
        );
        let err = wrapper.call(CallArguments::positional([Value::from(7)])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Return value of <function stringify> does not match annotation type <class 'str'>"
        );
        // The target ran.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn argument_failure_skips_call_and_return_check() {
        let calls = Arc::new(AtomicUsize::new(0));
        let wrapper = ReturnCheckingWrapper::new(
            schema(),
            stringify(calls.clone(), Value::from(7)),
            builtins().str.clone(),
        );
        let err = wrapper.call(CallArguments::positional([Value::from("7")])).unwrap_err();
        assert!(matches!(err, EnsureError::TypeMismatch { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_values_requires_a_type() {
        let target = Value::Callable(stringify(Arc::new(AtomicUsize::new(0)), Value::None));
        let schema_value = schema().to_value();

        let err = ReturnCheckingWrapper::from_values(&schema_value, &target, None).unwrap_err();
        assert!(matches!(
            err,
            EnsureError::Configuration(ConfigurationError::MissingReturnType)
        ));

        let err = ReturnCheckingWrapper::from_values(&schema_value, &target, Some(&Value::from("str")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: return annotation is not a type: 'str'"
        );

        let none_type = Value::from(&builtins().none_type);
        let wrapper =
            ReturnCheckingWrapper::from_values(&schema_value, &target, Some(&none_type)).unwrap();
        assert_eq!(wrapper.call(CallArguments::new()).unwrap(), Value::None);
    }

    #[test]
    fn delegates_like_the_inner_wrapper() {
        let target = stringify(Arc::new(AtomicUsize::new(0)), Value::from("x"));
        let wrapper = ReturnCheckingWrapper::new(schema(), target.clone(), builtins().str.clone());
        assert_eq!(wrapper.to_string(), "<function stringify>");
        assert_eq!(format!("{wrapper:?}"), "<function stringify>");
        assert_eq!(wrapper.get_attr("__name__"), Some(Value::from("stringify")));
        assert_eq!(
            wrapper.get_attr("return_type"),
            Some(Value::from(&builtins().str))
        );
        assert_eq!(wrapper.get_attr("schema"), Some(schema().to_value()));
        assert!(wrapper.set_attr("return_type", Value::None).is_err());
        assert!(wrapper.set_attr("target", Value::None).is_err());

        wrapper.set_attr("tag", Value::from("fast")).unwrap();
        assert_eq!(target.get_attr("tag"), Some(Value::from("fast")));
        assert_eq!(wrapper.as_wrapper().schema().len(), 1);
        assert_eq!(AsRef::<CallableWrapper>::as_ref(&wrapper).schema().len(), 1);
    }

    #[test]
    fn bound_form_checks_receiver_arguments_and_result() {
        let target: Arc<dyn Callable> = Arc::new(NativeFunction::new(
            "first",
            |args: CallArguments| Ok(args.positional.first().cloned().unwrap_or(Value::None)),
        ));
        let wrapper = Arc::new(ReturnCheckingWrapper::new(
            Schema::empty(),
            target,
            builtins().int.clone(),
        ));
        let bound = wrapper.bind(Value::from(3));
        assert_eq!(bound.call(CallArguments::new()).unwrap(), Value::from(3));

        let bound = wrapper.bind(Value::from("three"));
        let err = bound.call(CallArguments::new()).unwrap_err();
        assert!(matches!(err, EnsureError::ReturnMismatch { .. }));
    }
}
