//! Parent preview: the single nearest ancestor record an editor would see
//! as "inherited" before creating an instruction at a scope.
//!
//! This is not a merge. It returns one ancestor's own record so the editor
//! can name the source. Climbing is deliberately shallow:
//!
//! - master lease: the owning customer only.
//! - rider: the owning master lease, then one more hop to its customer.
//! - amendment: the owning rider (or master lease when not rider-attached) only.
//! - customer: nothing.

use crate::ccm::store::CcmStore;
use crate::ccm::types::CcmInstructionWithSections;
use crate::error::CoreError;
use crate::hierarchy::LeaseHierarchy;
use crate::scope::{ScopeLevel, ScopeRef};

pub async fn parent_preview<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    scope: ScopeRef,
) -> Result<Option<CcmInstructionWithSections>, CoreError> {
    if scope.level == ScopeLevel::Customer {
        return Ok(None);
    }

    let Some(parent) = hierarchy.parent_of(scope).await? else {
        return Ok(None);
    };

    let found = store.find_current(parent).await?;
    if found.is_some() || scope.level != ScopeLevel::Rider {
        return Ok(found);
    }

    match hierarchy.parent_of(parent).await? {
        Some(grandparent) => store.find_current(grandparent).await,
        None => Ok(None),
    }
}
