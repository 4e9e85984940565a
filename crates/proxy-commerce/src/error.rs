//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
///
/// Validation errors are returned before any state change; a failed
/// operation never leaves the cart partially mutated. Mutations on unknown
/// identifiers are no-ops rather than errors.
#[derive(Error, Debug)]
pub enum CartError {
    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity below the plan's minimum order size.
    #[error("Quantity {requested} below minimum {min} for plan {plan_id}")]
    BelowMinimumQuantity {
        plan_id: String,
        requested: i64,
        min: i64,
    },

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Plan requires a country but none was given.
    #[error("Plan {0} requires a country selection")]
    CountryRequired(String),
}
