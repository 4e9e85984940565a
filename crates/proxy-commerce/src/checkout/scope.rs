//! Checkout scope: which cart lines a submission covers.

use crate::cart::CartItem;
use crate::catalog::{PlanKind, TabKey};
use serde::{Deserialize, Serialize};

/// A filter over cart lines for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutScope {
    /// Everything in the cart.
    All,
    /// One purchase tab.
    Tab(TabKey),
    /// All plans of one kind (rotating-tab flows).
    Kind(PlanKind),
    /// Explicit country allow-list (dedicated-tab flows).
    Countries(Vec<String>),
}

impl CheckoutScope {
    /// Whether a cart line falls inside this scope.
    pub fn matches(&self, item: &CartItem) -> bool {
        match self {
            CheckoutScope::All => true,
            CheckoutScope::Tab(tab) => item.tab == *tab,
            CheckoutScope::Kind(kind) => item.plan.kind == *kind,
            CheckoutScope::Countries(allowed) => item
                .country
                .as_deref()
                .map(|c| allowed.iter().any(|a| a == c))
                .unwrap_or(false),
        }
    }

    /// Scope label carried on the order request.
    pub fn order_type(&self) -> &'static str {
        match self {
            CheckoutScope::All => "mixed",
            CheckoutScope::Tab(tab) => tab.as_str(),
            CheckoutScope::Kind(PlanKind::Rotating) => "rotating",
            CheckoutScope::Kind(PlanKind::Static) => "static",
            CheckoutScope::Countries(_) => "dedicated",
        }
    }
}
