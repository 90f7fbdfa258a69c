//! # ensure-core: Dynamic Value Model for Runtime Validation
//!
//! This crate is the leaf of the ensure workspace. It defines the runtime
//! values, type objects, call arguments, and callables that argument and
//! return-value validation operate on. Every other crate in the workspace
//! depends on `ensure-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Types are objects.** A `TypeRef` is a shared reference to a type
//!    object with declared bases and registered virtual subclasses, so an
//!    annotation can be any `Value` and "is this a type?" is a runtime
//!    question with a structured answer.
//!
//! 2. **One is-instance relation.** `Value::is_instance` is the only
//!    compatibility check. Subtypes satisfy supertypes; nothing is coerced.
//!
//! 3. **One capability interface.** `Callable` covers invoke, name, doc,
//!    printable identity, and attributes. Wrappers implement it by
//!    forwarding, which is what makes them drop-in substitutes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ensure-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Everything shared across calls is `Send + Sync`.

pub mod args;
pub mod callable;
pub mod error;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use args::CallArguments;
pub use callable::{descriptor_get, BoundMethod, Callable, NativeFunction};
pub use error::{CallResult, ConfigurationError, EnsureError};
pub use types::{builtins, Builtins, TypeRef, TypeRegistry};
pub use value::{Instance, Value, CLASS_KEY};
