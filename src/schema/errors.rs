//! Validation error codes and the structured error tree.
//!
//! Error codes:
//! - MANDATORY_INPUT_IS_NULL
//! - TYPE_ERROR_NOT_A_{STRING,NUMBER,BOOLEAN,DATE,OBJECT,UNION,ARRAY}
//! - OBJECT_FIELD_ERROR (per failing field)
//! - UNION_VARIANT_ERROR / UNION_VARIANT_NOT_FOUND
//! - ARRAY_ELEMENT_ERROR (first failing element only)
//! - VALIDATOR_ERROR (carries the validator's message)
//! - UNKNOWN_ALIAS_ERROR

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Machine-readable validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Null/absent input for a non-nullable node
    MandatoryInputIsNull,
    /// Value is not a string primitive
    NotAString,
    /// Value did not coerce to a finite number
    NotANumber,
    /// Value is not a boolean primitive
    NotABoolean,
    /// Value is not an epoch-millisecond number
    NotADate,
    /// Value is not an object
    NotAnObject,
    /// Value is not an object, so no union variant can be selected
    NotAUnion,
    /// Value is not an array
    NotAnArray,
    /// One or more declared fields failed
    ObjectFieldError,
    /// The selected union variant failed
    UnionVariantError,
    /// No variant discriminator key is present and truthy
    UnionVariantNotFound,
    /// An array element failed
    ArrayElementError,
    /// A user-supplied validator rejected the value
    ValidatorError,
    /// Alias name is not registered
    UnknownAlias,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MandatoryInputIsNull => "MANDATORY_INPUT_IS_NULL",
            ErrorCode::NotAString => "TYPE_ERROR_NOT_A_STRING",
            ErrorCode::NotANumber => "TYPE_ERROR_NOT_A_NUMBER",
            ErrorCode::NotABoolean => "TYPE_ERROR_NOT_A_BOOLEAN",
            ErrorCode::NotADate => "TYPE_ERROR_NOT_A_DATE",
            ErrorCode::NotAnObject => "TYPE_ERROR_NOT_AN_OBJECT",
            ErrorCode::NotAUnion => "TYPE_ERROR_NOT_A_UNION",
            ErrorCode::NotAnArray => "TYPE_ERROR_NOT_AN_ARRAY",
            ErrorCode::ObjectFieldError => "OBJECT_FIELD_ERROR",
            ErrorCode::UnionVariantError => "UNION_VARIANT_ERROR",
            ErrorCode::UnionVariantNotFound => "UNION_VARIANT_NOT_FOUND",
            ErrorCode::ArrayElementError => "ARRAY_ELEMENT_ERROR",
            ErrorCode::ValidatorError => "VALIDATOR_ERROR",
            ErrorCode::UnknownAlias => "UNKNOWN_ALIAS_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One node of the validation error tree.
///
/// The tree mirrors the shape of the checked value: object errors hold
/// only the failing fields, union errors hold exactly the selected
/// variant, array errors hold only the first failing element.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorNode {
    /// Structural mismatch or null-input violation
    Simple(ErrorCode),
    /// Validator rejection with its message
    Validator {
        /// Message reported by the validator
        message: Option<String>,
    },
    /// Failing fields of an object node
    ObjectFields {
        /// Field name to failure, failing fields only
        fields: BTreeMap<String, ErrorNode>,
    },
    /// Failure of the selected union variant
    UnionVariant {
        /// Name of the selected variant
        variant: String,
        /// Its failure
        error: Box<ErrorNode>,
    },
    /// First failing element of an array node
    ArrayElement {
        /// Zero-based index of the failing element
        index: usize,
        /// Its failure
        element: Box<ErrorNode>,
    },
}

impl ErrorNode {
    /// Returns the code for this node
    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorNode::Simple(code) => *code,
            ErrorNode::Validator { .. } => ErrorCode::ValidatorError,
            ErrorNode::ObjectFields { .. } => ErrorCode::ObjectFieldError,
            ErrorNode::UnionVariant { .. } => ErrorCode::UnionVariantError,
            ErrorNode::ArrayElement { .. } => ErrorCode::ArrayElementError,
        }
    }

    /// Renders the error tree as its JSON wire shape
    pub fn to_value(&self) -> Value {
        match self {
            ErrorNode::Simple(code) => json!({ "code": code.code() }),
            ErrorNode::Validator { message } => json!({
                "code": ErrorCode::ValidatorError.code(),
                "validator": message,
            }),
            ErrorNode::ObjectFields { fields } => {
                let mut rendered = Map::new();
                for (name, node) in fields {
                    rendered.insert(name.clone(), node.to_value());
                }
                json!({
                    "code": ErrorCode::ObjectFieldError.code(),
                    "fields": rendered,
                })
            }
            ErrorNode::UnionVariant { variant, error } => {
                let mut variants = Map::new();
                variants.insert(variant.clone(), error.to_value());
                json!({
                    "code": ErrorCode::UnionVariantError.code(),
                    "variants": variants,
                })
            }
            // The wire shape carries only the failing element; the index is
            // diagnostic context for Display and logs.
            ErrorNode::ArrayElement { element, .. } => json!({
                "code": ErrorCode::ArrayElementError.code(),
                "element": element.to_value(),
            }),
        }
    }
}

impl Serialize for ErrorNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorNode::Simple(code) => write!(f, "{}", code),
            ErrorNode::Validator { message } => match message {
                Some(msg) => write!(f, "{}: {}", ErrorCode::ValidatorError, msg),
                None => write!(f, "{}", ErrorCode::ValidatorError),
            },
            ErrorNode::ObjectFields { fields } => {
                let names: Vec<&str> = fields.keys().map(String::as_str).collect();
                write!(
                    f,
                    "{} at fields [{}]",
                    ErrorCode::ObjectFieldError,
                    names.join(", ")
                )
            }
            ErrorNode::UnionVariant { variant, error } => {
                write!(
                    f,
                    "{} at variant '{}': {}",
                    ErrorCode::UnionVariantError,
                    variant,
                    error
                )
            }
            ErrorNode::ArrayElement { index, element } => {
                write!(
                    f,
                    "{} at index {}: {}",
                    ErrorCode::ArrayElementError,
                    index,
                    element
                )
            }
        }
    }
}

impl std::error::Error for ErrorNode {}

/// Result type of a schema check
pub type CheckResult = Result<(), ErrorNode>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable_strings() {
        assert_eq!(
            ErrorCode::MandatoryInputIsNull.code(),
            "MANDATORY_INPUT_IS_NULL"
        );
        assert_eq!(ErrorCode::NotANumber.code(), "TYPE_ERROR_NOT_A_NUMBER");
        assert_eq!(
            ErrorCode::UnionVariantNotFound.code(),
            "UNION_VARIANT_NOT_FOUND"
        );
        assert_eq!(ErrorCode::UnknownAlias.code(), "UNKNOWN_ALIAS_ERROR");
    }

    #[test]
    fn test_object_error_renders_failing_fields_only() {
        let mut fields = BTreeMap::new();
        fields.insert("age".to_string(), ErrorNode::Simple(ErrorCode::NotANumber));

        let node = ErrorNode::ObjectFields { fields };
        let rendered = node.to_value();

        assert_eq!(rendered["code"], "OBJECT_FIELD_ERROR");
        assert_eq!(rendered["fields"]["age"]["code"], "TYPE_ERROR_NOT_A_NUMBER");
    }

    #[test]
    fn test_union_error_holds_exactly_one_variant() {
        let node = ErrorNode::UnionVariant {
            variant: "a".to_string(),
            error: Box::new(ErrorNode::Simple(ErrorCode::NotANumber)),
        };
        let rendered = node.to_value();

        let variants = rendered["variants"].as_object().unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants["a"]["code"], "TYPE_ERROR_NOT_A_NUMBER");
    }

    #[test]
    fn test_validator_error_carries_message() {
        let node = ErrorNode::Validator {
            message: Some("must be positive".to_string()),
        };
        let rendered = node.to_value();
        assert_eq!(rendered["code"], "VALIDATOR_ERROR");
        assert_eq!(rendered["validator"], "must be positive");
    }

    #[test]
    fn test_display_names_the_failure_site() {
        let node = ErrorNode::ArrayElement {
            index: 1,
            element: Box::new(ErrorNode::Simple(ErrorCode::NotAString)),
        };
        let display = format!("{}", node);
        assert!(display.contains("index 1"));
        assert!(display.contains("TYPE_ERROR_NOT_A_STRING"));
    }
}
