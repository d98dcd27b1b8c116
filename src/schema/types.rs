//! Type descriptor model.
//!
//! Supported node kinds:
//! - string: UTF-8 string primitive
//! - number: numeric, with string-to-float coercion at check time
//! - boolean: boolean primitive
//! - date: epoch-millisecond number, materialized as a UTC instant
//! - object: declared fields, each with its own descriptor
//! - array: homogeneous element descriptor
//! - union: ordered discriminated variants, first-match-wins
//! - alias: named reference resolved through the type registry

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Verdict returned by a user-supplied validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the value was accepted
    pub accepted: bool,
    /// Rejection message, if any
    pub message: Option<String>,
}

impl Verdict {
    /// Accept the value
    pub fn pass() -> Self {
        Self {
            accepted: true,
            message: None,
        }
    }

    /// Reject the value with a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: Some(message.into()),
        }
    }

    /// Accept iff `guard` holds; report `message` otherwise
    pub fn guard(guard: bool, message: impl Into<String>) -> Self {
        if guard {
            Self::pass()
        } else {
            Self::fail(message)
        }
    }
}

/// The value a validator sees after structural acceptance.
///
/// Number and date nodes coerce before validating, so the validator
/// receives the coerced form, not the raw input.
#[derive(Debug, Clone, Copy)]
pub enum CheckedValue<'a> {
    /// Accepted string primitive
    Str(&'a str),
    /// Coerced finite number
    Num(f64),
    /// Accepted boolean primitive
    Bool(bool),
    /// Instant built from an epoch-millisecond number
    Date(DateTime<Utc>),
    /// Whole object, union, or array value
    Composite(&'a Value),
}

/// User-supplied validator, run after structural acceptance at a node.
pub type ValidatorFn = dyn Fn(CheckedValue<'_>) -> Verdict + Send + Sync;

/// Node kind of a type descriptor.
///
/// The kind set is closed: a malformed tag cannot be represented, so the
/// "unsupported type tag" failure of looser schema encodings has no
/// counterpart here.
#[derive(Clone)]
pub enum TypeKind {
    /// UTF-8 string primitive
    String,
    /// Numeric value; strings are coerced by float parsing at check time
    Number,
    /// Boolean primitive
    Boolean,
    /// Epoch-millisecond number, checked as a UTC instant
    Date,
    /// Declared fields in declaration order; undeclared fields are ignored
    Object {
        /// Field name/descriptor pairs
        fields: Vec<(String, TypeDesc)>,
    },
    /// Homogeneous array (boxed to allow recursive descriptors)
    Array {
        /// Element descriptor
        element: Box<TypeDesc>,
    },
    /// Discriminated variants in declaration order; resolution is
    /// first-match-wins on the discriminator key
    Union {
        /// Variant name/descriptor pairs
        variants: Vec<(String, TypeDesc)>,
    },
    /// Named reference, resolved through the type registry at check time
    Alias {
        /// Registered type name
        name: String,
    },
}

impl TypeKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::Date => "date",
            TypeKind::Object { .. } => "object",
            TypeKind::Array { .. } => "array",
            TypeKind::Union { .. } => "union",
            TypeKind::Alias { .. } => "alias",
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Object { fields } => {
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "object{:?}", names)
            }
            TypeKind::Array { element } => write!(f, "array[{:?}]", element),
            TypeKind::Union { variants } => {
                let names: Vec<&str> = variants.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "union{:?}", names)
            }
            TypeKind::Alias { name } => write!(f, "alias({})", name),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// A node in the schema graph.
///
/// Every node optionally accepts null input (`nullable`) and optionally
/// carries a validator run after structural acceptance.
#[derive(Clone)]
pub struct TypeDesc {
    /// Node kind
    pub kind: TypeKind,
    /// Whether null/absent input is accepted (default false)
    pub nullable: bool,
    /// Validator run after structural acceptance
    pub validator: Option<Arc<ValidatorFn>>,
}

impl TypeDesc {
    fn of(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
            validator: None,
        }
    }

    /// String primitive descriptor
    pub fn string() -> Self {
        Self::of(TypeKind::String)
    }

    /// Number descriptor (string input is coerced by float parsing)
    pub fn number() -> Self {
        Self::of(TypeKind::Number)
    }

    /// Boolean primitive descriptor
    pub fn boolean() -> Self {
        Self::of(TypeKind::Boolean)
    }

    /// Date descriptor (epoch milliseconds)
    pub fn date() -> Self {
        Self::of(TypeKind::Date)
    }

    /// Object descriptor with fields in declaration order
    pub fn object<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, TypeDesc)>,
        N: Into<String>,
    {
        Self::of(TypeKind::Object {
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        })
    }

    /// Array descriptor with a homogeneous element type
    pub fn array(element: TypeDesc) -> Self {
        Self::of(TypeKind::Array {
            element: Box::new(element),
        })
    }

    /// Union descriptor with variants in declaration order
    pub fn union<I, N>(variants: I) -> Self
    where
        I: IntoIterator<Item = (N, TypeDesc)>,
        N: Into<String>,
    {
        Self::of(TypeKind::Union {
            variants: variants.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        })
    }

    /// Alias descriptor referencing a registered type name
    pub fn alias(name: impl Into<String>) -> Self {
        Self::of(TypeKind::Alias { name: name.into() })
    }

    /// Marks this node as accepting null/absent input
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches a validator run after structural acceptance
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(CheckedValue<'_>) -> Verdict + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub(crate) fn validate(&self, value: CheckedValue<'_>) -> Verdict {
        match &self.validator {
            Some(validator) => validator(value),
            None => Verdict::pass(),
        }
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
