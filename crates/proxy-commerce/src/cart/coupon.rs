//! Coupon types.

use crate::ids::CouponId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Value of a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CouponKind {
    /// Percentage off (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off.
    Fixed(Money),
}

/// A coupon definition, as returned by the coupon validation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Coupon code (e.g., "SAVE10").
    pub code: String,
    /// Value of the coupon.
    pub kind: CouponKind,
    /// End date (Unix timestamp), if any.
    pub expires_at: Option<i64>,
}

impl Coupon {
    /// Create a percentage coupon.
    pub fn percentage(code: impl Into<String>, percent: f64) -> Self {
        Self {
            id: CouponId::generate(),
            code: code.into(),
            kind: CouponKind::Percentage(percent),
            expires_at: None,
        }
    }

    /// Create a fixed-amount coupon.
    pub fn fixed(code: impl Into<String>, amount: Money) -> Self {
        Self {
            id: CouponId::generate(),
            code: code.into(),
            kind: CouponKind::Fixed(amount),
            expires_at: None,
        }
    }

    /// Calculate the discount this coupon yields against a subtotal.
    ///
    /// Fixed discounts are capped at the subtotal.
    pub fn discount_for(&self, subtotal: &Money) -> Money {
        match &self.kind {
            CouponKind::Percentage(percent) => subtotal.percentage(*percent),
            CouponKind::Fixed(amount) => {
                if amount.amount_cents > subtotal.amount_cents {
                    *subtotal
                } else {
                    *amount
                }
            }
        }
    }
}

/// The coupon currently applied to the cart.
///
/// At most one coupon is active cart-wide. The discount amount is the one
/// validated against the subtotal at apply time; it is not re-validated
/// automatically when the cart changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    /// The coupon code used.
    pub code: String,
    /// Discount against the last-validated subtotal.
    pub discount: Money,
    /// Coupon metadata from validation.
    pub coupon: Coupon,
}

impl AppliedCoupon {
    /// Create from a validated coupon and calculated discount.
    pub fn new(coupon: Coupon, discount: Money) -> Self {
        Self {
            code: coupon.code.clone(),
            discount,
            coupon,
        }
    }
}
