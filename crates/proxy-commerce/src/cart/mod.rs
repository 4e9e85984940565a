//! Cart state: line items, coupon, store, and derived totals.

mod coupon;
mod item;
mod pricing;
mod store;

pub use coupon::{AppliedCoupon, Coupon, CouponKind};
pub use item::{CartItem, DurationTerm, ItemOptions, ItemProperty, QuantityBounds};
pub use pricing::CartTotals;
pub use store::{CartStore, PricingRequest, MAX_QUANTITY_PER_ITEM};
