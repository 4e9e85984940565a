//! Proxy plan descriptors and tab classification.

use crate::ids::PlanId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// How a plan allocates proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Rotating pool access, priced nominally per unit.
    Rotating,
    /// Static/dedicated allocation, priced server-side per country.
    Static,
}

/// Product category of a static plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanCategory {
    PremiumIsp,
    PrivateIpv4,
    SharedIpv4,
    Ipv6,
}

/// Purchase tab a cart line belongs to.
///
/// Derived deterministically from the plan at insertion time and immutable
/// thereafter. Each tab holds an independent item collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TabKey {
    Rotating,
    PremiumIsp,
    PrivateIpv4,
    SharedIpv4,
    Ipv6,
}

impl TabKey {
    /// Classify a plan into its purchase tab.
    ///
    /// Total over all plan shapes: rotating plans always land in the
    /// rotating tab, static plans map by category.
    pub fn for_plan(plan: &Plan) -> TabKey {
        match plan.kind {
            PlanKind::Rotating => TabKey::Rotating,
            PlanKind::Static => match plan.category {
                PlanCategory::PremiumIsp => TabKey::PremiumIsp,
                PlanCategory::PrivateIpv4 => TabKey::PrivateIpv4,
                PlanCategory::SharedIpv4 => TabKey::SharedIpv4,
                PlanCategory::Ipv6 => TabKey::Ipv6,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabKey::Rotating => "rotating",
            TabKey::PremiumIsp => "premium_isp",
            TabKey::PrivateIpv4 => "private_ipv4",
            TabKey::SharedIpv4 => "shared_ipv4",
            TabKey::Ipv6 => "ipv6",
        }
    }
}

/// An immutable plan descriptor.
///
/// Owned by the catalog; the cart holds a read-only copy per line so a
/// line's nominal price and constraints are stable for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Allocation kind.
    pub kind: PlanKind,
    /// Product category.
    pub category: PlanCategory,
    /// Nominal per-unit price.
    pub price: Money,
    /// Minimum order quantity.
    pub min_quantity: i64,
    /// Whether a country must be selected before ordering.
    pub country_required: bool,
    /// Whether the plan is currently purchasable.
    pub active: bool,
}

impl Plan {
    /// Create a plan with default constraints (min quantity 1, no country).
    pub fn new(
        id: PlanId,
        name: impl Into<String>,
        kind: PlanKind,
        category: PlanCategory,
        price: Money,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            category,
            price,
            min_quantity: 1,
            country_required: false,
            active: true,
        }
    }

    /// Require a country selection for this plan.
    pub fn with_country_required(mut self) -> Self {
        self.country_required = true;
        self
    }

    /// Set the minimum order quantity.
    pub fn with_min_quantity(mut self, min: i64) -> Self {
        self.min_quantity = min;
        self
    }

    /// Whether the authoritative price must come from the pricing endpoint.
    ///
    /// Rotating plans use the nominal price directly; static allocations
    /// are priced per country server-side.
    pub fn requires_remote_pricing(&self) -> bool {
        self.kind == PlanKind::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn plan(kind: PlanKind, category: PlanCategory) -> Plan {
        Plan::new(
            PlanId::new("plan-1"),
            "Test Plan",
            kind,
            category,
            Money::new(1000, Currency::USD),
        )
    }

    #[test]
    fn test_rotating_always_classifies_to_rotating_tab() {
        for category in [
            PlanCategory::PremiumIsp,
            PlanCategory::PrivateIpv4,
            PlanCategory::SharedIpv4,
            PlanCategory::Ipv6,
        ] {
            let p = plan(PlanKind::Rotating, category);
            assert_eq!(TabKey::for_plan(&p), TabKey::Rotating);
        }
    }

    #[test]
    fn test_static_classifies_by_category() {
        assert_eq!(
            TabKey::for_plan(&plan(PlanKind::Static, PlanCategory::PremiumIsp)),
            TabKey::PremiumIsp
        );
        assert_eq!(
            TabKey::for_plan(&plan(PlanKind::Static, PlanCategory::PrivateIpv4)),
            TabKey::PrivateIpv4
        );
        assert_eq!(
            TabKey::for_plan(&plan(PlanKind::Static, PlanCategory::SharedIpv4)),
            TabKey::SharedIpv4
        );
        assert_eq!(
            TabKey::for_plan(&plan(PlanKind::Static, PlanCategory::Ipv6)),
            TabKey::Ipv6
        );
    }

    #[test]
    fn test_remote_pricing_rule() {
        assert!(!plan(PlanKind::Rotating, PlanCategory::SharedIpv4).requires_remote_pricing());
        assert!(plan(PlanKind::Static, PlanCategory::PrivateIpv4).requires_remote_pricing());
    }
}
