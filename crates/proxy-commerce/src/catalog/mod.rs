//! Plan catalog types.

mod plan;

pub use plan::{Plan, PlanCategory, PlanKind, TabKey};
