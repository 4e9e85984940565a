//! Pricing resolver: plan + country + quantity -> authoritative price.
//!
//! The resolver is the only pricing suspension point in the engine. It
//! never fails: a collaborator error degrades to the plan's nominal unit
//! price and the cart line stays intact and checkout-eligible. The cart's
//! computed total is advisory; final pricing is validated server-side at
//! order creation.

use crate::api::PricingApi;
use crate::cart::{CartStore, PricingRequest};
use crate::catalog::TabKey;
use crate::ids::{ItemId, PlanId};
use crate::money::Money;
use std::collections::HashSet;
use std::sync::Mutex;

/// Outcome of one price resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceResolution {
    /// Per-unit price; the caller scales by quantity.
    pub unit_price: Money,
    /// Units available, when reported.
    pub available_count: Option<i64>,
    /// Whether this is the nominal fallback rather than a quote.
    pub fallback: bool,
}

/// Resolves authoritative prices for cart lines.
pub struct PricingResolver<P: PricingApi> {
    api: P,
    // At most one call in flight per (plan, country).
    in_flight: Mutex<HashSet<(PlanId, Option<String>)>>,
}

impl<P: PricingApi> PricingResolver<P> {
    pub fn new(api: P) -> Self {
        Self {
            api,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Resolve the per-unit price for a request snapshot.
    ///
    /// Returns `None` when a resolution for the same (plan, country) is
    /// already in flight; the earlier call's result will cover the line.
    pub async fn resolve(&self, request: &PricingRequest) -> Option<PriceResolution> {
        let key = (request.plan_id.clone(), request.country.clone());
        {
            let mut in_flight = self.in_flight.lock().ok()?;
            if !in_flight.insert(key.clone()) {
                return None;
            }
        }

        let result = self
            .api
            .calculate_price(&request.plan_id, request.country.as_deref())
            .await;

        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&key);
        }

        Some(match result {
            Ok(quote) => PriceResolution {
                unit_price: quote.price,
                available_count: quote.available_count,
                fallback: false,
            },
            Err(err) => {
                tracing::warn!(
                    plan = %request.plan_id,
                    country = request.country.as_deref().unwrap_or("any"),
                    %err,
                    "price resolution failed, using nominal price"
                );
                PriceResolution {
                    unit_price: request.nominal_unit_price,
                    available_count: None,
                    fallback: true,
                }
            }
        })
    }

    /// Resolve and apply a price for one cart line.
    ///
    /// Snapshots the line's parameters, awaits the quote, then re-checks
    /// the live line before applying; a line mutated while the call was in
    /// flight keeps its current pricing. Returns whether a price was
    /// applied.
    pub async fn price_item(
        &self,
        store: &mut CartStore,
        tab: TabKey,
        item_id: &ItemId,
    ) -> bool {
        let Some(request) = store.pricing_request(tab, item_id) else {
            return false;
        };
        let Some(resolution) = self.resolve(&request).await else {
            return false;
        };
        store.apply_resolution(&request, resolution.unit_price, resolution.available_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, PriceQuote};
    use crate::cart::ItemOptions;
    use crate::catalog::{Plan, PlanCategory, PlanKind};
    use crate::money::Currency;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedApi {
        unit_cents: i64,
        available: Option<i64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PricingApi for FixedApi {
        async fn calculate_price(
            &self,
            _plan_id: &PlanId,
            _country: Option<&str>,
        ) -> Result<PriceQuote, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PriceQuote {
                price: Money::new(self.unit_cents, Currency::USD),
                available_count: self.available,
            })
        }
    }

    struct FailingApi;

    #[async_trait]
    impl PricingApi for FailingApi {
        async fn calculate_price(
            &self,
            _plan_id: &PlanId,
            _country: Option<&str>,
        ) -> Result<PriceQuote, ApiError> {
            Err(ApiError::Network("connection refused".into()))
        }
    }

    struct GatedApi {
        entered: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl PricingApi for GatedApi {
        async fn calculate_price(
            &self,
            _plan_id: &PlanId,
            _country: Option<&str>,
        ) -> Result<PriceQuote, ApiError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(PriceQuote {
                price: Money::new(300, Currency::USD),
                available_count: None,
            })
        }
    }

    fn dedicated_plan(unit_cents: i64) -> Plan {
        Plan::new(
            PlanId::new("d1"),
            "Private IPv4",
            PlanKind::Static,
            PlanCategory::PrivateIpv4,
            Money::new(unit_cents, Currency::USD),
        )
        .with_country_required()
    }

    #[tokio::test]
    async fn test_price_item_applies_quote() {
        let mut store = CartStore::new();
        let id = store
            .add_item(
                dedicated_plan(500),
                2,
                Some("SG".into()),
                ItemOptions::default(),
                None,
                None,
            )
            .unwrap();

        let resolver = PricingResolver::new(FixedApi {
            unit_cents: 450,
            available: Some(10),
            calls: AtomicUsize::new(0),
        });

        assert!(resolver.price_item(&mut store, TabKey::PrivateIpv4, &id).await);
        let item = store.item(TabKey::PrivateIpv4, &id).unwrap();
        assert_eq!(item.calculated_price.unwrap().amount_cents, 900);
        assert_eq!(item.bounds.unwrap().max, 10);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_nominal_price() {
        let mut store = CartStore::new();
        let id = store
            .add_item(
                dedicated_plan(500),
                3,
                Some("SG".into()),
                ItemOptions::default(),
                None,
                None,
            )
            .unwrap();

        let resolver = PricingResolver::new(FailingApi);
        assert!(resolver.price_item(&mut store, TabKey::PrivateIpv4, &id).await);

        // Fallback equals plan.price * quantity exactly; line stays present.
        let item = store.item(TabKey::PrivateIpv4, &id).unwrap();
        assert_eq!(item.calculated_price.unwrap().amount_cents, 1500);
        assert_eq!(item.line_total().amount_cents, 1500);
    }

    #[tokio::test]
    async fn test_resolution_for_missing_item_is_noop() {
        let mut store = CartStore::new();
        let resolver = PricingResolver::new(FailingApi);
        assert!(
            !resolver
                .price_item(&mut store, TabKey::PrivateIpv4, &ItemId::new("ghost"))
                .await
        );
    }

    #[tokio::test]
    async fn test_at_most_one_in_flight_per_plan_country() {
        let entered = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let resolver = Arc::new(PricingResolver::new(GatedApi {
            entered: entered.clone(),
            release: release.clone(),
        }));

        let request = PricingRequest {
            item_id: ItemId::new("item-1"),
            tab: TabKey::PrivateIpv4,
            plan_id: PlanId::new("d1"),
            country: Some("SG".into()),
            quantity: 1,
            nominal_unit_price: Money::new(500, Currency::USD),
        };

        let first = {
            let resolver = resolver.clone();
            let request = request.clone();
            tokio::spawn(async move { resolver.resolve(&request).await })
        };

        // Wait until the first call is inside the API, then issue a duplicate.
        entered.notified().await;
        assert!(resolver.resolve(&request).await.is_none());

        release.notify_one();
        let resolution = first.await.unwrap().unwrap();
        assert_eq!(resolution.unit_price.amount_cents, 300);
        assert!(!resolution.fallback);

        // Slot freed after completion.
        release.notify_one();
        let second = {
            let resolver = resolver.clone();
            let request = request.clone();
            tokio::spawn(async move { resolver.resolve(&request).await })
        };
        entered.notified().await;
        release.notify_one();
        assert!(second.await.unwrap().is_some());
    }
}
