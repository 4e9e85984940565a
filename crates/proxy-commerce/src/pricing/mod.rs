//! Asynchronous price resolution.

mod resolver;

pub use resolver::{PriceResolution, PricingResolver};
