//! CCM instruction overrides across the lease hierarchy.
//!
//! - [`types`]: the instruction model, section variants, and DTOs.
//! - [`store`]: the persistence trait and instruction/section operations.
//! - [`tree`]: the scope tree annotated with override presence.
//! - [`preview`]: nearest-ancestor preview for an instruction not yet created.
//! - [`merge`]: the effective configuration for a hierarchy path or car.

pub mod merge;
pub mod preview;
pub mod store;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use merge::{resolve, resolve_for_car, resolve_for_scope, EffectiveCcm};
pub use preview::parent_preview;
pub use store::CcmStore;
pub use tree::{build_tree, HierarchyNode};
