//! Derived cart aggregates.
//!
//! Totals are never stored; they are recomputed from the item collection
//! on every read so they always reflect the latest applied mutation.

use crate::cart::CartItem;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Aggregate view over a set of cart lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals before discount.
    pub subtotal: Money,
    /// Discount attributable to the active coupon.
    pub discount: Money,
    /// Subtotal minus discount, floored at zero.
    pub total: Money,
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of quantities (display: total IPs).
    pub ip_count: i64,
    /// Number of distinct lines (display: locations).
    pub location_count: usize,
}

impl CartTotals {
    /// Compute totals over a set of lines with an optional discount.
    pub fn compute<'a>(
        items: impl Iterator<Item = &'a CartItem> + Clone,
        discount: Option<Money>,
        currency: Currency,
    ) -> CartTotals {
        let line_totals: Vec<Money> = items.clone().map(|i| i.line_total()).collect();
        let subtotal =
            Money::try_sum(line_totals.iter(), currency).unwrap_or(Money::zero(currency));

        let discount = discount.unwrap_or(Money::zero(currency));
        let total = subtotal.saturating_deduct(&discount);

        let line_count = line_totals.len();
        let ip_count = items.map(|i| i.quantity).sum();

        CartTotals {
            subtotal,
            discount,
            total,
            line_count,
            ip_count,
            location_count: line_count,
        }
    }

    /// Check if any discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.amount_cents > 0
    }
}
