//! Cart line item types.

use crate::catalog::{Plan, TabKey};
use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Duration term for plans sold by period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationTerm {
    #[serde(rename = "7day")]
    SevenDay,
    #[serde(rename = "30day")]
    ThirtyDay,
}

impl DurationTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationTerm::SevenDay => "7day",
            DurationTerm::ThirtyDay => "30day",
        }
    }
}

/// A free-form option on a cart line (rotation interval, speed tier, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperty {
    pub name: String,
    pub value: String,
}

/// Option payload fixed at insertion time.
///
/// Part of the line's identity: two adds with different options produce
/// two lines even for the same plan and country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemOptions {
    /// Duration term, when the plan is sold by period.
    pub duration: Option<DurationTerm>,
    /// Plan-specific extras.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ItemProperty>,
}

impl ItemOptions {
    /// Options with just a duration term.
    pub fn duration(term: DurationTerm) -> Self {
        Self {
            duration: Some(term),
            extras: Vec::new(),
        }
    }

    /// Add a plan-specific extra.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.push(ItemProperty {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Advisory quantity bounds for UI quantity controls.
///
/// Not authoritative over server-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBounds {
    pub min: i64,
    pub max: i64,
}

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line identifier, stable across quantity/price mutations.
    pub id: ItemId,
    /// Purchase tab, derived from the plan at insertion; immutable.
    pub tab: TabKey,
    /// Read-only copy of the plan descriptor.
    pub plan: Plan,
    /// Quantity, always >= 1.
    pub quantity: i64,
    /// ISO country code; absent means "any country".
    pub country: Option<String>,
    /// Option payload, immutable after insertion.
    pub options: ItemOptions,
    /// Authoritative line total from the pricing endpoint, when known.
    pub calculated_price: Option<Money>,
    /// Advisory quantity bounds.
    pub bounds: Option<QuantityBounds>,
}

impl CartItem {
    /// Whether another identity tuple matches this line.
    ///
    /// Identity within a tab is `(plan.id, country, options)`.
    pub fn matches_identity(
        &self,
        plan_id: &crate::ids::PlanId,
        country: Option<&str>,
        options: &ItemOptions,
    ) -> bool {
        &self.plan.id == plan_id
            && self.country.as_deref() == country
            && &self.options == options
    }

    /// Displayed/charged total for this line.
    ///
    /// Falls back to the nominal `plan.price * quantity` when no
    /// authoritative price is known.
    pub fn line_total(&self) -> Money {
        self.calculated_price.unwrap_or_else(|| {
            // Quantity is capped at insertion, so this cannot overflow
            // realistic cent amounts; saturate rather than wrap regardless.
            Money::new(
                self.plan.price.amount_cents.saturating_mul(self.quantity),
                self.plan.price.currency,
            )
        })
    }

    /// Per-unit price implied by the current line total.
    pub fn effective_unit_price(&self) -> Money {
        if self.quantity == 0 {
            return self.plan.price;
        }
        let total = self.line_total();
        Money::new(total.amount_cents / self.quantity, total.currency)
    }
}
