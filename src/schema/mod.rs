//! Schema representation and validation.
//!
//! A schema is a graph of [`TypeDesc`] nodes. Alias nodes are resolved by
//! name against a [`TypeRegistry`] at check time, not at definition time,
//! so recursive schemas are representable without special-casing.

pub mod checker;
pub mod errors;
pub mod registry;
pub mod types;

pub use checker::TypeChecker;
pub use errors::{CheckResult, ErrorCode, ErrorNode};
pub use registry::TypeRegistry;
pub use types::{CheckedValue, TypeDesc, TypeKind, Verdict};
