//! # Error Types
//!
//! Domain-specific error types for carpet-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carpet-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  carpet-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  carpet-pos errors                                                     │
//! │  ├── ServiceError     - Validation / NotFound / Conflict / Transport   │
//! │  └── CheckoutError    - ServiceError + the checkout stage it hit       │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → ServiceError → CheckoutError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Inventory item is not part of the snapshot being worked on.
    #[error("Inventory item not found: {0}")]
    ItemNotFound(String),

    /// Invoice is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Paying a cancelled invoice
    /// - Moving a paid invoice back to draft
    #[error("Invoice {invoice_id} cannot move from {from} to {to}")]
    InvalidInvoiceStatus {
        invoice_id: String,
        from: String,
        to: String,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are always caller-fixable and never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A reference points at something the caller did not supply.
    #[error("{field} references unknown id '{id}'")]
    UnknownReference { field: String, id: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidInvoiceStatus {
            invoice_id: "inv-1".to_string(),
            from: "cancelled".to_string(),
            to: "paid".to_string(),
        };
        assert_eq!(err.to_string(), "Invoice inv-1 cannot move from cancelled to paid");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("sku").to_string(), "sku is required");

        let err = ValidationError::UnknownReference {
            field: "item_id".to_string(),
            id: "rug-9".to_string(),
        };
        assert_eq!(err.to_string(), "item_id references unknown id 'rug-9'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("sku").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
