//! # Service Error Types
//!
//! The error taxonomy callers of the ledger and checkout see.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Error Categories                           │
//! │                                                                         │
//! │  Validation   caller-fixable input, never retried                      │
//! │  NotFound     the item / customer / invoice does not exist             │
//! │  Conflict     the row moved under us; retry from a fresh read          │
//! │  Transport    store unreachable or undecodable; retry with backoff     │
//! │                                                                         │
//! │  DbError ──────┐                                                        │
//! │  CoreError ────┼──► ServiceError ──► CheckoutError { stage, cause }     │
//! │  ValidationErr ┘                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use carpet_core::{CoreError, ValidationError};
use carpet_db::DbError;
use std::fmt;
use thiserror::Error;

use crate::checkout::CheckoutState;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by [`crate::StockLedger`] and the store traits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Input was rejected.
    ///
    /// ## When This Occurs
    /// - Negative movement quantity or the reserved `transfer` kind
    /// - Submitted invoice totals that disagree with the lines
    /// - Duplicate customer email
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Optimistic concurrency check failed.
    ///
    /// ## When This Occurs
    /// - Another writer changed the item between our read and our commit
    #[error("Conflict on {entity} {id}: {reason}")]
    Conflict {
        entity: String,
        id: String,
        reason: String,
    },

    /// The store could not be reached or returned something unreadable.
    #[error("Store unavailable: {0}")]
    Transport(String),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    ///
    /// ## Retryable Errors
    /// - Conflicts (re-read, then retry)
    /// - Transport failures
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::Conflict { .. } | ServiceError::Transport(_)
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => ServiceError::not_found("InventoryItem", id),
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

/// ## Error Mapping
/// ```text
/// DbError::NotFound                    → NotFound
/// DbError::VersionConflict             → Conflict
/// DbError::UniqueViolation/ForeignKey  → Validation
/// DbError::Validation/InvalidTransition→ Validation
/// everything else                      → Transport
/// ```
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::VersionConflict {
                entity,
                id,
                expected,
                actual,
            } => ServiceError::Conflict {
                entity,
                id,
                reason: format!("expected version {}, found {}", expected, actual),
            },
            e @ (DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::InvalidTransition(_)) => ServiceError::Validation(e.to_string()),
            DbError::Validation(e) => ServiceError::Validation(e.to_string()),
            other => ServiceError::Transport(other.to_string()),
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// A failed checkout: where it stopped and why.
///
/// `customer_id` is set when the customer was already created, so a caller
/// can tell "nothing happened" apart from "customer exists, no invoice".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutError {
    pub stage: CheckoutState,
    pub cause: ServiceError,
    pub customer_id: Option<String>,
}

impl CheckoutError {
    pub fn new(stage: CheckoutState, cause: ServiceError) -> Self {
        CheckoutError {
            stage,
            cause,
            customer_id: None,
        }
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Retryable when the cause is and no customer was left behind.
    pub fn is_retryable(&self) -> bool {
        self.customer_id.is_none() && self.cause.is_retryable()
    }
}

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checkout failed during {}: {}", self.stage, self.cause)?;
        if let Some(id) = &self.customer_id {
            write!(f, " (customer {} was created)", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ServiceError::Transport("timeout".into()).is_retryable());
        assert!(ServiceError::Conflict {
            entity: "InventoryItem".into(),
            id: "rug-1".into(),
            reason: "stale".into(),
        }
        .is_retryable());

        assert!(!ServiceError::Validation("bad".into()).is_retryable());
        assert!(!ServiceError::not_found("InventoryItem", "rug-1").is_retryable());
    }

    #[test]
    fn test_db_error_mapping() {
        let conflict: ServiceError = DbError::VersionConflict {
            entity: "InventoryItem".into(),
            id: "rug-1".into(),
            expected: 3,
            actual: 4,
        }
        .into();
        assert!(matches!(conflict, ServiceError::Conflict { ref id, .. } if id == "rug-1"));

        let missing: ServiceError = DbError::not_found("Customer", "c-1").into();
        assert_eq!(missing, ServiceError::not_found("Customer", "c-1"));

        let dup: ServiceError = DbError::duplicate("email", "a@b.c").into();
        assert!(matches!(dup, ServiceError::Validation(_)));

        let down: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(down, ServiceError::Transport(_)));
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ServiceError = CoreError::ItemNotFound("rug-9".into()).into();
        assert_eq!(err, ServiceError::not_found("InventoryItem", "rug-9"));

        let err: ServiceError = CoreError::CartTooLarge { max: 100 }.into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_checkout_error_display() {
        let err = CheckoutError::new(
            CheckoutState::InvoiceCreating,
            ServiceError::Transport("connection reset".into()),
        )
        .with_customer("cust-1");

        assert_eq!(
            err.to_string(),
            "Checkout failed during invoice_creating: Store unavailable: connection reset \
             (customer cust-1 was created)"
        );
        assert!(!err.is_retryable());
    }
}
