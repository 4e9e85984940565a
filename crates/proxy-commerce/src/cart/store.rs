//! Cart store: source of truth for cart contents.
//!
//! The store owns per-tab item collections plus the cart-wide coupon. All
//! reads are pure projections of this state; all mutations are synchronous
//! and atomic with respect to each other. Mutations on unknown identifiers
//! are no-ops, never errors.

use crate::cart::{AppliedCoupon, CartItem, CartTotals, ItemOptions, QuantityBounds};
use crate::catalog::{Plan, TabKey};
use crate::error::CartError;
use crate::ids::{ItemId, PlanId};
use crate::money::{Currency, Money};
use crate::storage::CartSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Parameter snapshot for an in-flight price resolution.
///
/// Asynchronous pricing is correlated back to the cart by identifier, not
/// by position: a resolution is only applied if the live line still matches
/// the parameters the request was issued with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingRequest {
    pub item_id: ItemId,
    pub tab: TabKey,
    pub plan_id: PlanId,
    pub country: Option<String>,
    pub quantity: i64,
    /// Nominal per-unit price, used as the fallback on resolver failure.
    pub nominal_unit_price: Money,
}

/// Source of truth for cart contents.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    tabs: BTreeMap<TabKey, Vec<CartItem>>,
    coupon: Option<AppliedCoupon>,
    currency: Currency,
}

impl CartStore {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a cart from a persisted snapshot.
    pub fn restore(snapshot: CartSnapshot) -> Self {
        Self {
            tabs: snapshot.tabs,
            coupon: snapshot.coupon,
            currency: snapshot.currency,
        }
    }

    /// Snapshot the cart for persistence.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            tabs: self.tabs.clone(),
            coupon: self.coupon.clone(),
            currency: self.currency,
        }
    }

    /// Add a line to the cart, or merge into an existing line.
    ///
    /// The tab is derived from the plan. If a line with the same identity
    /// tuple `(plan.id, country, options)` already exists in that tab, its
    /// quantity and price are replaced in place rather than creating a
    /// duplicate; adding twice is equivalent to adding once.
    ///
    /// `precomputed_total` is the authoritative line total when the caller
    /// already has one; when omitted for a plan that requires remote
    /// pricing, the caller is expected to follow up with the resolver.
    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &mut self,
        plan: Plan,
        quantity: i64,
        country: Option<String>,
        options: ItemOptions,
        precomputed_total: Option<Money>,
        bounds: Option<QuantityBounds>,
    ) -> Result<ItemId, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if quantity < plan.min_quantity {
            return Err(CartError::BelowMinimumQuantity {
                plan_id: plan.id.to_string(),
                requested: quantity,
                min: plan.min_quantity,
            });
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CartError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }
        if plan.country_required && country.is_none() {
            return Err(CartError::CountryRequired(plan.id.to_string()));
        }

        let tab = TabKey::for_plan(&plan);
        let items = self.tabs.entry(tab).or_default();

        if let Some(existing) = items
            .iter_mut()
            .find(|i| i.matches_identity(&plan.id, country.as_deref(), &options))
        {
            existing.quantity = quantity;
            existing.calculated_price = precomputed_total;
            if bounds.is_some() {
                existing.bounds = bounds;
            }
            tracing::debug!(tab = tab.as_str(), item = %existing.id, "merged cart line");
            return Ok(existing.id.clone());
        }

        let item = CartItem {
            id: ItemId::generate(),
            tab,
            plan,
            quantity,
            country,
            options,
            calculated_price: precomputed_total,
            bounds,
        };
        let id = item.id.clone();
        tracing::debug!(tab = tab.as_str(), item = %id, "added cart line");
        items.push(item);
        Ok(id)
    }

    /// Update a line's quantity.
    ///
    /// A quantity below 1 removes the line. Any known authoritative total
    /// is re-scaled linearly from its implied per-unit price; callers with
    /// nonlinear volume pricing use [`CartStore::update_item`] instead.
    pub fn update_quantity(
        &mut self,
        tab: TabKey,
        item_id: &ItemId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            self.remove_item(tab, item_id);
            return Ok(());
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CartError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let Some(item) = self
            .tabs
            .get_mut(&tab)
            .and_then(|items| items.iter_mut().find(|i| &i.id == item_id))
        else {
            return Ok(());
        };

        if let Some(total) = item.calculated_price {
            let unit = total.amount_cents / item.quantity;
            item.calculated_price = Money::new(unit, total.currency)
                .try_multiply(quantity)
                .or(item.calculated_price);
        }
        item.quantity = quantity;
        Ok(())
    }

    /// Set a line's quantity and authoritative total atomically.
    ///
    /// Used when per-unit price is nonlinear (volume pricing) and the
    /// caller has a recalculated total from the pricing endpoint.
    pub fn update_item(
        &mut self,
        tab: TabKey,
        item_id: &ItemId,
        quantity: i64,
        calculated_total: Money,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            self.remove_item(tab, item_id);
            return Ok(());
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CartError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        if let Some(item) = self
            .tabs
            .get_mut(&tab)
            .and_then(|items| items.iter_mut().find(|i| &i.id == item_id))
        {
            item.quantity = quantity;
            item.calculated_price = Some(calculated_total);
        }
        Ok(())
    }

    /// Remove a line. No-op if the line does not exist.
    pub fn remove_item(&mut self, tab: TabKey, item_id: &ItemId) -> bool {
        let Some(items) = self.tabs.get_mut(&tab) else {
            return false;
        };
        let len_before = items.len();
        items.retain(|i| &i.id != item_id);
        let removed = items.len() < len_before;
        if removed {
            tracing::debug!(tab = tab.as_str(), item = %item_id, "removed cart line");
        }
        removed
    }

    /// Remove all lines in one tab; other tabs are untouched.
    pub fn clear_tab(&mut self, tab: TabKey) {
        self.tabs.remove(&tab);
    }

    /// Remove all lines across all tabs and drop the coupon.
    pub fn clear(&mut self) {
        self.tabs.clear();
        self.coupon = None;
    }

    /// Remove exactly the named lines from one tab.
    ///
    /// Used for partial post-checkout cleanup; ids not present are ignored.
    pub fn remove_items(&mut self, tab: TabKey, item_ids: &[ItemId]) {
        if let Some(items) = self.tabs.get_mut(&tab) {
            items.retain(|i| !item_ids.contains(&i.id));
        }
    }

    /// All lines across all tabs, tab order then insertion order.
    pub fn all_items(&self) -> Vec<&CartItem> {
        self.tabs.values().flatten().collect()
    }

    /// Lines in one tab, insertion order.
    pub fn tab_items(&self, tab: TabKey) -> &[CartItem] {
        self.tabs.get(&tab).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a line by id.
    pub fn item(&self, tab: TabKey, item_id: &ItemId) -> Option<&CartItem> {
        self.tabs
            .get(&tab)
            .and_then(|items| items.iter().find(|i| &i.id == item_id))
    }

    /// Whether the cart has no lines in any tab.
    pub fn is_empty(&self) -> bool {
        self.tabs.values().all(|items| items.is_empty())
    }

    /// Apply a coupon, replacing any existing one.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) {
        tracing::debug!(code = %coupon.code, "applied coupon");
        self.coupon = Some(coupon);
    }

    /// Remove the active coupon.
    pub fn remove_coupon(&mut self) -> bool {
        self.coupon.take().is_some()
    }

    /// The active coupon, if any.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Totals over the whole cart with the active coupon's discount.
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(
            self.tabs.values().flatten(),
            self.coupon.as_ref().map(|c| c.discount),
            self.currency,
        )
    }

    /// Snapshot a line's parameters for a price resolution.
    ///
    /// Returns `None` if the line does not exist.
    pub fn pricing_request(&self, tab: TabKey, item_id: &ItemId) -> Option<PricingRequest> {
        let item = self.item(tab, item_id)?;
        Some(PricingRequest {
            item_id: item.id.clone(),
            tab,
            plan_id: item.plan.id.clone(),
            country: item.country.clone(),
            quantity: item.quantity,
            nominal_unit_price: item.plan.price,
        })
    }

    /// Apply a completed price resolution to the line it was issued for.
    ///
    /// The line is re-fetched by id and its current plan, country, and
    /// quantity are compared against the request snapshot; a stale
    /// resolution (parameters no longer matching) is discarded silently.
    /// Returns whether the resolution was applied.
    pub fn apply_resolution(
        &mut self,
        request: &PricingRequest,
        unit_price: Money,
        available_count: Option<i64>,
    ) -> bool {
        let Some(item) = self
            .tabs
            .get_mut(&request.tab)
            .and_then(|items| items.iter_mut().find(|i| i.id == request.item_id))
        else {
            return false;
        };

        let live_matches = item.plan.id == request.plan_id
            && item.country == request.country
            && item.quantity == request.quantity;
        if !live_matches {
            tracing::debug!(item = %request.item_id, "discarding stale price resolution");
            return false;
        }

        let Some(total) = unit_price.try_multiply(item.quantity) else {
            return false;
        };
        item.calculated_price = Some(total);

        if let Some(max) = available_count {
            item.bounds = Some(QuantityBounds {
                min: item.plan.min_quantity.max(1),
                max,
            });
        }
        true
    }
}
