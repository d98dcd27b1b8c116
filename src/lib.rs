//! callgate - a schema-validating, failure-isolating request dispatch layer
//!
//! Untyped request payloads are checked against a declarative, recursive
//! schema; validated calls are routed to registered async handlers; every
//! request's failure is caught at its own pipeline boundary and turned into
//! a structured outcome.

pub mod dispatch;
pub mod observability;
pub mod schema;
