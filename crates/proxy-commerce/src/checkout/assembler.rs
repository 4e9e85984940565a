//! Checkout assembler.
//!
//! Turns a scoped view of the cart into an order submission, and cleans up
//! exactly what was submitted. The cart is left completely unmodified on
//! any failure, with one specified exception: a coupon the order service
//! rejects is removed from the cart.

use crate::api::{ApiError, ApiOrderStatus, OrderApi, OrderLine, OrderRequest};
use crate::cart::{CartStore, CartTotals};
use crate::catalog::TabKey;
use crate::checkout::CheckoutScope;
use crate::ids::{ItemId, OrderId};
use crate::money::Money;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Why a checkout attempt failed. Exactly one is reported per attempt.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckoutError {
    /// The scope matched no cart lines; nothing was submitted.
    #[error("No items in the selected scope")]
    EmptyScope,

    /// Balance would go negative; nothing was submitted.
    #[error("Insufficient balance: need {required}, have {balance}")]
    InsufficientBalance { required: Money, balance: Money },

    /// The order service rejected the coupon. The coupon has been removed
    /// from the cart; items are untouched.
    #[error("Coupon invalid or expired")]
    InvalidOrExpiredCoupon,

    /// A submitted plan is no longer purchasable.
    #[error("Plan no longer active")]
    PlanNoLongerActive,

    /// Transport failure; retry is manual.
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Another submission is outstanding; concurrent attempts are refused.
    #[error("A checkout submission is already in flight")]
    SubmissionInFlight,

    /// Any other order-creation failure.
    #[error("Order creation failed: {0}")]
    Unknown(String),
}

/// User-facing fulfillment outcome of a created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    /// Order fulfilled immediately.
    Immediate,
    /// Order accepted, fulfillment is asynchronous.
    Deferred,
    /// Order created; status unrecognized but never an error.
    Created,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub order_id: OrderId,
    pub order_number: String,
    pub fulfillment: Fulfillment,
    /// Scoped total (after discount) the order was submitted at.
    pub charged: Money,
}

/// Assembles and submits orders from the cart.
pub struct CheckoutAssembler<O: OrderApi> {
    orders: O,
    // Duplicate-submit guard; one outstanding submission at a time.
    submitting: AtomicBool,
}

impl<O: OrderApi> CheckoutAssembler<O> {
    pub fn new(orders: O) -> Self {
        Self {
            orders,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether a submission is currently outstanding.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Check out the scoped portion of the cart against an external balance.
    ///
    /// On success, exactly the submitted lines are removed from the cart,
    /// grouped per tab; lines added to other scopes while the submission
    /// was in flight are untouched.
    pub async fn checkout(
        &self,
        store: &mut CartStore,
        scope: &CheckoutScope,
        balance: Money,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CheckoutError::SubmissionInFlight);
        }
        let result = self.submit(store, scope, balance).await;
        self.submitting.store(false, Ordering::SeqCst);
        result
    }

    async fn submit(
        &self,
        store: &mut CartStore,
        scope: &CheckoutScope,
        balance: Money,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        // Snapshot the scoped lines before any suspension point; cleanup is
        // correlated by item id, never by position.
        let mut submitted: Vec<(TabKey, ItemId)> = Vec::new();
        let mut lines: Vec<OrderLine> = Vec::new();
        let scoped: Vec<_> = store
            .all_items()
            .into_iter()
            .filter(|i| scope.matches(i))
            .collect();

        if scoped.is_empty() {
            return Err(CheckoutError::EmptyScope);
        }

        let totals = CartTotals::compute(
            scoped.iter().copied(),
            store.coupon().map(|c| c.discount),
            store.currency(),
        );
        let charged = totals.total;

        let insufficient = balance
            .try_subtract(&charged)
            .map(|remaining| remaining.is_negative())
            .unwrap_or(true);
        if insufficient {
            return Err(CheckoutError::InsufficientBalance {
                required: charged,
                balance,
            });
        }

        for item in &scoped {
            submitted.push((item.tab, item.id.clone()));
            lines.push(OrderLine {
                plan_id: item.plan.id.clone(),
                quantity: item.quantity,
                country: item.country.clone(),
                duration: item.options.duration,
                options: item.options.extras.clone(),
            });
        }

        let request = OrderRequest {
            order_type: scope.order_type().to_string(),
            items: lines,
            coupon_code: store.coupon().map(|c| c.code.clone()),
        };

        tracing::info!(
            order_type = request.order_type.as_str(),
            lines = request.items.len(),
            total = %charged,
            "submitting order"
        );

        let receipt = match self.orders.create_order(&request).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.map_failure(store, err)),
        };

        // Remove exactly the submitted ids, once per tab. Never a blanket
        // clear: other tabs may have gained items while this was in flight.
        let mut by_tab: BTreeMap<TabKey, Vec<ItemId>> = BTreeMap::new();
        for (tab, id) in submitted {
            by_tab.entry(tab).or_default().push(id);
        }
        for (tab, ids) in by_tab {
            store.remove_items(tab, &ids);
        }
        if store.is_empty() {
            store.remove_coupon();
        }

        let fulfillment = match receipt.status {
            ApiOrderStatus::Fulfilled => Fulfillment::Immediate,
            ApiOrderStatus::Processing => Fulfillment::Deferred,
            ApiOrderStatus::Other(_) => Fulfillment::Created,
        };

        tracing::info!(order = %receipt.order_number, "order created");

        Ok(CheckoutOutcome {
            order_id: receipt.order_id,
            order_number: receipt.order_number,
            fulfillment,
            charged,
        })
    }

    fn map_failure(&self, store: &mut CartStore, err: ApiError) -> CheckoutError {
        match err {
            ApiError::CouponRejected(_) => {
                store.remove_coupon();
                CheckoutError::InvalidOrExpiredCoupon
            }
            ApiError::PlanInactive(_) => CheckoutError::PlanNoLongerActive,
            ApiError::Network(_) => CheckoutError::NetworkUnavailable,
            ApiError::Service { message, .. } => CheckoutError::Unknown(message),
        }
    }
}
