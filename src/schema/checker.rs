//! Recursive-descent schema checker.
//!
//! Check semantics:
//! - An absent descriptor accepts unconditionally (no constraint).
//! - Null input is accepted iff the node is nullable.
//! - Validators run only after structural acceptance, against the
//!   coerced value where coercion applies (number, date).
//! - Error trees mirror the input's shape: failing object fields only,
//!   exactly the selected union variant, first failing array element.
//!
//! The checker borrows its registry and never mutates input values;
//! checking is deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::errors::{CheckResult, ErrorCode, ErrorNode};
use super::registry::TypeRegistry;
use super::types::{CheckedValue, TypeDesc, TypeKind, Verdict};

/// Schema checker backed by a type registry for alias resolution.
pub struct TypeChecker<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> TypeChecker<'a> {
    /// Creates a checker backed by the given registry
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Checks a value against an optional descriptor.
    ///
    /// No descriptor means no constraint: any value is accepted.
    pub fn check_optional(&self, value: &Value, desc: Option<&TypeDesc>) -> CheckResult {
        match desc {
            Some(desc) => self.check(value, desc),
            None => Ok(()),
        }
    }

    /// Checks a value against a descriptor.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorNode`] tree describing the failure site.
    pub fn check(&self, value: &Value, desc: &TypeDesc) -> CheckResult {
        if value.is_null() {
            if desc.nullable {
                Ok(())
            } else {
                Err(ErrorNode::Simple(ErrorCode::MandatoryInputIsNull))
            }
        } else {
            self.check_kind(value, desc)
        }
    }

    fn check_kind(&self, value: &Value, desc: &TypeDesc) -> CheckResult {
        match &desc.kind {
            TypeKind::String => match value.as_str() {
                Some(s) => verdict(desc.validate(CheckedValue::Str(s))),
                None => Err(ErrorNode::Simple(ErrorCode::NotAString)),
            },

            TypeKind::Number => {
                // Deliberate coercion: the validator sees the parsed
                // number, not the original value.
                let coerced = coerce_number(value)
                    .ok_or(ErrorNode::Simple(ErrorCode::NotANumber))?;
                verdict(desc.validate(CheckedValue::Num(coerced)))
            }

            TypeKind::Boolean => match value.as_bool() {
                Some(b) => verdict(desc.validate(CheckedValue::Bool(b))),
                None => Err(ErrorNode::Simple(ErrorCode::NotABoolean)),
            },

            TypeKind::Date => {
                let instant = value
                    .as_f64()
                    .filter(|ms| ms.is_finite())
                    .and_then(to_instant)
                    .ok_or(ErrorNode::Simple(ErrorCode::NotADate))?;
                verdict(desc.validate(CheckedValue::Date(instant)))
            }

            TypeKind::Object { fields } => {
                let obj = value
                    .as_object()
                    .ok_or(ErrorNode::Simple(ErrorCode::NotAnObject))?;

                // Missing fields check as null; undeclared fields are
                // ignored.
                let mut failures = BTreeMap::new();
                for (name, field_desc) in fields {
                    let field_value = obj.get(name).unwrap_or(&Value::Null);
                    if let Err(err) = self.check(field_value, field_desc) {
                        failures.insert(name.clone(), err);
                    }
                }

                if failures.is_empty() {
                    verdict(desc.validate(CheckedValue::Composite(value)))
                } else {
                    Err(ErrorNode::ObjectFields { fields: failures })
                }
            }

            TypeKind::Union { variants } => {
                let obj = value
                    .as_object()
                    .ok_or(ErrorNode::Simple(ErrorCode::NotAUnion))?;

                for (name, variant_desc) in variants {
                    let discriminator = obj.get(name).unwrap_or(&Value::Null);
                    if !is_truthy(discriminator) {
                        continue;
                    }
                    // First match wins: the whole value is checked against
                    // the selected variant and that verdict is final, even
                    // on failure. No backtracking.
                    return match self.check(value, variant_desc) {
                        Ok(()) => verdict(desc.validate(CheckedValue::Composite(value))),
                        Err(err) => Err(ErrorNode::UnionVariant {
                            variant: name.clone(),
                            error: Box::new(err),
                        }),
                    };
                }

                Err(ErrorNode::Simple(ErrorCode::UnionVariantNotFound))
            }

            TypeKind::Array { element } => {
                let items = value
                    .as_array()
                    .ok_or(ErrorNode::Simple(ErrorCode::NotAnArray))?;

                // First failing element short-circuits; later elements are
                // never checked.
                for (index, item) in items.iter().enumerate() {
                    if let Err(err) = self.check(item, element) {
                        return Err(ErrorNode::ArrayElement {
                            index,
                            element: Box::new(err),
                        });
                    }
                }

                verdict(desc.validate(CheckedValue::Composite(value)))
            }

            // Late-bound: resolved on every pass, so recursive schemas
            // terminate with the value, not the type graph.
            TypeKind::Alias { name } => match self.registry.lookup(name) {
                Some(resolved) => self.check(value, resolved),
                None => Err(ErrorNode::Simple(ErrorCode::UnknownAlias)),
            },
        }
    }
}

fn verdict(verdict: Verdict) -> CheckResult {
    if verdict.accepted {
        Ok(())
    } else {
        Err(ErrorNode::Validator {
            message: verdict.message,
        })
    }
}

/// Coerces a value to a finite float: numbers pass through, strings are
/// parsed whole. Everything else fails.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn to_instant(ms: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms as i64)
}

/// Discriminator truthiness: null, false, zero, and the empty string are
/// falsy; everything else, including empty arrays and objects, is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
