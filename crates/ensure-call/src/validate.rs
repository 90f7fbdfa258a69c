//! # Argument Validation
//!
//! Resolves each schema descriptor to the argument actually supplied and
//! checks it against the declared type before the target runs.
//!
//! ## Resolution
//!
//! For each descriptor, in schema order:
//!
//! 1. A position inside the supplied positional arguments wins. A keyword
//!    of the same name is then never consulted.
//! 2. Otherwise the keyword of the descriptor's name is used.
//! 3. Neither supplied: the descriptor is skipped. Arity and completeness
//!    are the target's business.
//!
//! A resolved value whose annotation is not a type fails with a
//! configuration error; a value that is not an instance of the type fails
//! with `TypeMismatch`. The first failure ends validation and the target is
//! never invoked.

use ensure_core::{CallArguments, CallResult, Callable, EnsureError, TypeRef, Value};
use ensure_schema::{ParameterDescriptor, Schema};

/// The supplied value for `descriptor`, if any.
pub fn resolve_argument<'a>(
    descriptor: &ParameterDescriptor,
    args: &'a CallArguments,
) -> Option<&'a Value> {
    match descriptor.position() {
        Some(position) if position < args.positional.len() => args.positional.get(position),
        _ => args.keyword.get(descriptor.name()),
    }
}

/// Check every supplied, declared argument. Does not call `target`; it is
/// only used to name the callable in errors.
pub fn check_args(
    args: &CallArguments,
    schema: &Schema,
    target: &dyn Callable,
) -> Result<(), EnsureError> {
    for descriptor in schema {
        let Some(value) = resolve_argument(descriptor, args) else {
            tracing::trace!(argument = descriptor.name(), "not supplied, skipped");
            continue;
        };
        let expected = descriptor.expected_type()?;
        if !value.is_instance(expected) {
            let err = EnsureError::TypeMismatch {
                argument: descriptor.name().to_string(),
                target: target.repr(),
                expected: expected.repr(),
            };
            tracing::debug!(argument = descriptor.name(), found = %value.repr(), "{err}");
            return Err(err);
        }
        tracing::trace!(argument = descriptor.name(), "argument accepted");
    }
    Ok(())
}

/// Check a call result against the declared return type.
pub fn check_return(
    result: &Value,
    return_type: &TypeRef,
    target: &dyn Callable,
) -> Result<(), EnsureError> {
    if result.is_instance(return_type) {
        return Ok(());
    }
    let err = EnsureError::ReturnMismatch {
        target: target.repr(),
        expected: return_type.repr(),
    };
    tracing::debug!(found = %result.repr(), "{err}");
    Err(err)
}

/// Validate `args` against `schema`, then invoke `target` with the
/// unmodified arguments. Target failures propagate unchanged.
pub fn validate_and_call(args: CallArguments, schema: &Schema, target: &dyn Callable) -> CallResult {
    check_args(&args, schema, target)?;
    target.call(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ensure_core::{builtins, ConfigurationError, NativeFunction};

    /// A target that counts invocations and echoes its arguments back.
    fn counting_target(calls: Arc<AtomicUsize>) -> NativeFunction {
        NativeFunction::new("target", move |args: CallArguments| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Tuple(vec![
                Value::List(args.positional),
                Value::Dict(args.keyword),
            ]))
        })
    }

    fn int_x_at_0() -> Schema {
        Schema::new(vec![ParameterDescriptor::positional("x", &builtins().int, 0).unwrap()])
    }

    #[test]
    fn empty_schema_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = counting_target(calls.clone());
        let args = CallArguments::positional([Value::from("anything")]).with_keyword("k", 1.5);
        let expected = Value::Tuple(vec![
            Value::List(args.positional.clone()),
            Value::Dict(args.keyword.clone()),
        ]);
        let result = validate_and_call(args, &Schema::empty(), &target).unwrap();
        assert_eq!(result, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn positional_value_wins_over_keyword() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = counting_target(calls.clone());
        let args = CallArguments::positional([Value::from(5)]).with_keyword("x", "not an int");
        validate_and_call(args, &int_x_at_0(), &target).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keyword_fallback() {
        let target = counting_target(Arc::new(AtomicUsize::new(0)));
        let ok = CallArguments::new().with_keyword("x", 5);
        assert!(validate_and_call(ok, &int_x_at_0(), &target).is_ok());

        let bad = CallArguments::new().with_keyword("x", "s");
        let err = validate_and_call(bad, &int_x_at_0(), &target).unwrap_err();
        match err {
            EnsureError::TypeMismatch { argument, target, expected } => {
                assert_eq!(argument, "x");
                assert_eq!(target, "<function target>");
                assert_eq!(expected, "<class 'int'>");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_position_uses_keyword_path() {
        let schema = Schema::new(vec![
            ParameterDescriptor::positional("y", &builtins().str, 3).unwrap(),
        ]);
        let target = counting_target(Arc::new(AtomicUsize::new(0)));
        let args = CallArguments::positional([Value::from(1)]).with_keyword("y", 2);
        let err = check_args(&args, &schema, &target).unwrap_err();
        assert!(matches!(err, EnsureError::TypeMismatch { ref argument, .. } if argument == "y"));
    }

    #[test]
    fn absent_arguments_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = counting_target(calls.clone());
        let schema = Schema::new(vec![
            ParameterDescriptor::positional("x", &builtins().int, 0).unwrap(),
            ParameterDescriptor::keyword("y", &builtins().str).unwrap(),
        ]);
        validate_and_call(CallArguments::positional([Value::from(1)]), &schema, &target).unwrap();
        validate_and_call(CallArguments::new(), &schema, &target).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn first_failure_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = counting_target(calls.clone());
        let schema = Schema::new(vec![
            ParameterDescriptor::positional("a", &builtins().int, 0).unwrap(),
            ParameterDescriptor::positional("b", &builtins().int, 1).unwrap(),
        ]);
        let args = CallArguments::positional([Value::from("one"), Value::from("two")]);
        let err = validate_and_call(args, &schema, &target).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Argument a to <function target> does not match annotation type <class 'int'>"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subtype_values_satisfy_supertypes() {
        let target = counting_target(Arc::new(AtomicUsize::new(0)));
        let schema = Schema::new(vec![
            ParameterDescriptor::positional("flag", &builtins().int, 0).unwrap(),
            ParameterDescriptor::positional("n", &builtins().number, 1).unwrap(),
            ParameterDescriptor::positional("o", &builtins().object, 2).unwrap(),
        ]);
        let args = CallArguments::positional([Value::from(true), Value::from(2.5), Value::None]);
        assert!(check_args(&args, &schema, &target).is_ok());
    }

    #[test]
    fn non_type_annotation_fails_only_when_resolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let target = counting_target(calls.clone());
        let schema = Schema::new(vec![
            ParameterDescriptor::new("x", Value::from("int"), Some(0)).unwrap(),
        ]);

        validate_and_call(CallArguments::new(), &schema, &target).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let err = validate_and_call(CallArguments::positional([Value::from(1)]), &schema, &target)
            .unwrap_err();
        assert!(matches!(
            err,
            EnsureError::Configuration(ConfigurationError::AnnotationNotAType { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn target_failures_propagate_unchanged() {
        let target = NativeFunction::new("boom", |_args: CallArguments| {
            Err(EnsureError::target(std::io::Error::new(
                std::io::ErrorKind::Other,
                "exploded",
            )))
        });
        let err = validate_and_call(CallArguments::new(), &Schema::empty(), &target).unwrap_err();
        assert!(matches!(err, EnsureError::Target(_)));
        assert_eq!(err.to_string(), "exploded");
    }

    #[test]
    fn return_check() {
        let target = counting_target(Arc::new(AtomicUsize::new(0)));
        assert!(check_return(&Value::from(1), &builtins().int, &target).is_ok());
        let err = check_return(&Value::from("1"), &builtins().int, &target).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Return value of <function target> does not match annotation type <class 'int'>"
        );
    }
}
