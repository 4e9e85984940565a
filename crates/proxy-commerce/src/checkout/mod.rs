//! Checkout: scoped order assembly and post-checkout cleanup.

mod assembler;
mod scope;

pub use assembler::{CheckoutAssembler, CheckoutError, CheckoutOutcome, Fulfillment};
pub use scope::CheckoutScope;
