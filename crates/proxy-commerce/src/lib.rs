//! Cart and order-composition engine for the ProxyPort storefront.
//!
//! This crate owns the one stateful part of the storefront: the multi-tab
//! shopping cart that backs the purchase flow.
//!
//! - **Catalog**: plan descriptors and tab classification
//! - **Cart**: per-tab item collections, coupon, derived totals
//! - **Pricing**: async price resolution with stale-result discard
//! - **Checkout**: scoped order assembly and exact post-checkout cleanup
//!
//! # Example
//!
//! ```rust,ignore
//! use proxy_commerce::prelude::*;
//!
//! // Add a rotating plan; nominal pricing, no resolver call.
//! let mut cart = CartStore::new();
//! let id = cart.add_item(plan, 3, None, ItemOptions::default(), None, None)?;
//!
//! // Resolve authoritative pricing for a dedicated line.
//! let resolver = PricingResolver::new(pricing_client);
//! resolver.price_item(&mut cart, TabKey::PrivateIpv4, &id).await;
//!
//! // Check out one scope; only the submitted lines are removed.
//! let assembler = CheckoutAssembler::new(order_client);
//! let outcome = assembler
//!     .checkout(&mut cart, &CheckoutScope::Tab(TabKey::PrivateIpv4), balance)
//!     .await?;
//! println!("Order {}", outcome.order_number);
//! ```

pub mod api;
pub mod error;
pub mod ids;
pub mod money;
pub mod storage;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod pricing;

pub use error::CartError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CartError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Plan, PlanCategory, PlanKind, TabKey};

    // Cart
    pub use crate::cart::{
        AppliedCoupon, CartItem, CartStore, CartTotals, Coupon, CouponKind, DurationTerm,
        ItemOptions, ItemProperty, PricingRequest, QuantityBounds,
    };

    // Pricing
    pub use crate::pricing::{PriceResolution, PricingResolver};

    // Checkout
    pub use crate::checkout::{
        CheckoutAssembler, CheckoutError, CheckoutOutcome, CheckoutScope, Fulfillment,
    };

    // Collaborators
    pub use crate::api::{
        ApiError, ApiOrderStatus, CouponApi, CouponValidation, OrderApi, OrderLine, OrderReceipt,
        OrderRequest, PlanApi, PlanCountries, PriceQuote, PricingApi,
    };

    // Persistence
    pub use crate::storage::{CartSnapshot, CartStorage, MemoryStorage, StorageError};
}
