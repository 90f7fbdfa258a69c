//! # ensure-call: Validated Call Dispatch
//!
//! Checks call arguments against a [`Schema`](ensure_schema::Schema) before a
//! target runs, and optionally checks the result afterwards.
//!
//! ## Validator (`validate`)
//!
//! - [`check_args`]: resolve each descriptor to the supplied argument
//!   (position first, then keyword, else skip) and check its type.
//! - [`validate_and_call`]: `check_args`, then call the target with the
//!   unmodified arguments.
//!
//! ## Wrappers (`wrapper`, `returns`)
//!
//! - [`CallableWrapper`]: a `Callable` that validates on every invocation
//!   and forwards everything else to its target. Binds to instances like a
//!   method.
//! - [`ReturnCheckingWrapper`]: a `CallableWrapper` plus a return-type
//!   check after the call.
//!
//! ## Crate Policy
//!
//! - Validation never mutates arguments, schemas, or targets.
//! - The target is invoked only after every supplied, declared argument
//!   passed; the return check runs only after a successful invocation.
//! - Failures raised by a target are propagated unchanged.

pub mod returns;
pub mod validate;
pub mod wrapper;

pub use returns::ReturnCheckingWrapper;
pub use validate::{check_args, check_return, resolve_argument, validate_and_call};
pub use wrapper::{CallableWrapper, WRAPPER_FIELDS};
