//! Property tests for the subtype relation over generated class hierarchies.

use ensure_core::{builtins, TypeRef, Value};
use proptest::prelude::*;

/// Build a hierarchy where class `i` derives from the classes named by
/// `parents[i]` (indices strictly below `i`, so the graph stays acyclic).
fn build_hierarchy(parents: &[Vec<usize>]) -> Vec<TypeRef> {
    let mut classes: Vec<TypeRef> = Vec::with_capacity(parents.len());
    for (i, picks) in parents.iter().enumerate() {
        let bases: Vec<TypeRef> = if i == 0 {
            Vec::new()
        } else {
            let mut idx: Vec<usize> = picks.iter().map(|p| p % i).collect();
            idx.sort_unstable();
            idx.dedup();
            idx.into_iter().map(|p| classes[p].clone()).collect()
        };
        classes.push(TypeRef::new_class(format!("C{i}"), Some("gen"), bases));
    }
    classes
}

fn hierarchy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..64, 0..3), 1..12)
}

proptest! {
    /// Every class is a subtype of itself and of `object`.
    #[test]
    fn reflexive_and_rooted(parents in hierarchy()) {
        let classes = build_hierarchy(&parents);
        for class in &classes {
            prop_assert!(class.is_subtype_of(class));
            prop_assert!(class.is_subtype_of(&builtins().object));
        }
    }

    /// Subtyping is transitive.
    #[test]
    fn transitive(parents in hierarchy()) {
        let classes = build_hierarchy(&parents);
        for a in &classes {
            for b in &classes {
                for c in &classes {
                    if a.is_subtype_of(b) && b.is_subtype_of(c) {
                        prop_assert!(a.is_subtype_of(c), "{a} <: {b} <: {c}");
                    }
                }
            }
        }
    }

    /// Distinct classes are never mutual subtypes.
    #[test]
    fn antisymmetric(parents in hierarchy()) {
        let classes = build_hierarchy(&parents);
        for a in &classes {
            for b in &classes {
                if a != b {
                    prop_assert!(!(a.is_subtype_of(b) && b.is_subtype_of(a)));
                }
            }
        }
    }

    /// Integers are instances of int, Number and object, never of str.
    #[test]
    fn ints_are_numbers(n in any::<i64>()) {
        let b = builtins();
        let value = Value::from(n);
        prop_assert!(value.is_instance(&b.int));
        prop_assert!(value.is_instance(&b.number));
        prop_assert!(value.is_instance(&b.object));
        prop_assert!(!value.is_instance(&b.str));
    }
}

#[test]
fn virtual_subclass_registration_is_visible_to_values() {
    let serializable = TypeRef::new_class("Serializable", Some("io"), vec![]);
    assert!(!Value::from("text").is_instance(&serializable));
    serializable
        .register_virtual_subclass(&builtins().str)
        .unwrap();
    assert!(Value::from("text").is_instance(&serializable));
    assert!(!Value::from(1).is_instance(&serializable));
}
