//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any executor, where the call may run inside a
//! transaction) as the first argument.

pub mod ccm_instruction_repo;
pub mod ccm_section_repo;
pub mod lease_hierarchy_repo;

pub use ccm_instruction_repo::CcmInstructionRepo;
pub use ccm_section_repo::{CcmLiningRepo, CcmSealingRepo};
pub use lease_hierarchy_repo::LeaseHierarchyRepo;
