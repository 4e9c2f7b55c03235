//! Filter error types

use thiserror::Error;

/// Errors raised while turning filter parameters into a predicate
///
/// Every variant is fatal to the request that produced it. Coercion
/// fallbacks and dropped identifiers are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Operator name not registered for the field
    #[error("Unknown operator '{operator}' for field '{field}'")]
    UnknownOperator { field: String, operator: String },

    /// Raw value does not have the shape the operator requires
    #[error("Malformed value for field '{field}': {reason}")]
    MalformedValue { field: String, reason: String },

    /// Negation requested on an operator that does not opt in
    #[error("Operator '{operator}' on field '{field}' does not support negation")]
    UnsupportedNegation { field: String, operator: String },

    /// Field is not in the configured whitelist
    #[error("Cannot filter by field: {field}")]
    FieldNotAllowed { field: String },

    #[error("Maximum {max} filters allowed, got {count}")]
    TooManyFilters { count: usize, max: usize },

    #[error("Value for field '{field}' is {len} bytes, maximum is {max}")]
    ValueTooLarge { field: String, len: usize, max: usize },

    /// Filter parameter key could not be split into field and operator
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),
}

impl FilterError {
    pub fn unknown_operator(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::UnknownOperator {
            field: field.into(),
            operator: operator.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_negation(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::UnsupportedNegation {
            field: field.into(),
            operator: operator.into(),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownOperator { .. } => "UNKNOWN_OPERATOR",
            Self::MalformedValue { .. } => "MALFORMED_VALUE",
            Self::UnsupportedNegation { .. } => "UNSUPPORTED_NEGATION",
            Self::FieldNotAllowed { .. } => "INVALID_FILTER_FIELD",
            Self::TooManyFilters { .. } => "TOO_MANY_FILTERS",
            Self::ValueTooLarge { .. } => "FILTER_VALUE_TOO_LARGE",
            Self::InvalidParameter(_) => "INVALID_FILTER_PARAMETER",
        }
    }
}
