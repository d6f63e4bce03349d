//! Row structs for the CCM and lease hierarchy tables.
//!
//! Each row type implements `FromRow` and converts into the matching
//! `ccm_core` domain type.

pub mod ccm_instruction;
pub mod ccm_section;
pub mod lease_hierarchy;
