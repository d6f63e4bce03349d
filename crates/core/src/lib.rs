//! Domain layer for customer CCM instructions (railcar cleaning and servicing).
//!
//! Instructions are declared at four nested scopes (customer, master lease,
//! rider, amendment). This crate holds the model, the collaborator traits
//! for persistence and the lease hierarchy, and the services that build the
//! scope tree, preview inherited values, and merge an effective
//! configuration. It has no database dependency.

pub mod ccm;
pub mod error;
pub mod hierarchy;
pub mod scope;
pub mod types;
