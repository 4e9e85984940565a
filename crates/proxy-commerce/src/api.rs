//! Collaborator contracts consumed by the engine.
//!
//! Implementations (HTTP clients, mocks) live outside this crate; the
//! engine only depends on these traits. Any transport satisfying the
//! request/response shapes is conformant.

use crate::cart::{Coupon, DurationTerm, ItemProperty};
use crate::ids::{OrderId, PlanId};
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by collaborator calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (offline, timeout, DNS).
    #[error("Network unavailable: {0}")]
    Network(String),

    /// Coupon rejected or expired by the service.
    #[error("Coupon rejected: {0}")]
    CouponRejected(String),

    /// Plan no longer purchasable.
    #[error("Plan no longer active: {0}")]
    PlanInactive(String),

    /// Any other service-side failure.
    #[error("Service error {code}: {message}")]
    Service { code: u16, message: String },
}

/// Countries a plan can be ordered in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanCountries {
    pub countries: Vec<String>,
    pub country_required: bool,
}

/// Authoritative per-unit price for a plan in a country.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    /// Per-unit price (price for quantity = 1).
    pub price: Money,
    /// Units currently available, when the service reports it.
    pub available_count: Option<i64>,
}

/// A successfully validated coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CouponValidation {
    pub coupon: Coupon,
    /// Discount against the subtotal the coupon was validated with.
    pub discount: Money,
}

/// One line of an order submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub plan_id: PlanId,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ItemProperty>,
}

/// An order submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    /// Scope label for the order (e.g., "rotating", "dedicated").
    #[serde(rename = "type")]
    pub order_type: String,
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// Fulfillment state reported at order creation.
///
/// No returned status is an error; unknown statuses are carried through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiOrderStatus {
    Fulfilled,
    Processing,
    #[serde(untagged)]
    Other(String),
}

/// Response from order creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderReceipt {
    pub status: ApiOrderStatus,
    pub order_number: String,
    pub order_id: OrderId,
}

/// Plan metadata service.
#[async_trait]
pub trait PlanApi: Send + Sync {
    /// Countries available for a plan, checked before a country-scoped add.
    async fn plan_countries(&self, plan_id: &PlanId) -> Result<PlanCountries, ApiError>;
}

/// Remote pricing endpoint.
#[async_trait]
pub trait PricingApi: Send + Sync {
    /// Authoritative per-unit price for a plan, optionally per country.
    async fn calculate_price(
        &self,
        plan_id: &PlanId,
        country: Option<&str>,
    ) -> Result<PriceQuote, ApiError>;
}

/// Coupon validation service.
#[async_trait]
pub trait CouponApi: Send + Sync {
    /// Validate a code against a subtotal, yielding the discount it grants.
    async fn validate_coupon(
        &self,
        code: &str,
        subtotal: Money,
    ) -> Result<CouponValidation, ApiError>;
}

/// Order creation service.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_order_request_wire_shape() {
        let request = OrderRequest {
            order_type: "rotating".into(),
            items: vec![OrderLine {
                plan_id: PlanId::new("plan-1"),
                quantity: 3,
                country: None,
                duration: Some(DurationTerm::ThirtyDay),
                options: Vec::new(),
            }],
            coupon_code: Some("SAVE10".into()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "rotating");
        assert_eq!(json["items"][0]["duration"], "30day");
        assert_eq!(json["coupon_code"], "SAVE10");
        assert!(json["items"][0].get("country").is_none());
    }

    #[test]
    fn test_order_status_parses_unknown_values() {
        let status: ApiOrderStatus = serde_json::from_str("\"fulfilled\"").unwrap();
        assert_eq!(status, ApiOrderStatus::Fulfilled);

        let status: ApiOrderStatus = serde_json::from_str("\"queued\"").unwrap();
        assert_eq!(status, ApiOrderStatus::Other("queued".into()));
    }

    #[test]
    fn test_price_quote_round_trip() {
        let quote = PriceQuote {
            price: Money::new(450, Currency::USD),
            available_count: Some(12),
        };
        let json = serde_json::to_string(&quote).unwrap();
        let back: PriceQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
    }
}
