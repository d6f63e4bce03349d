//! Read-only view of the external lease hierarchy.
//!
//! Customers own master leases, master leases own riders, and amendments
//! attach to a rider or directly to a master lease. The tables themselves
//! belong to the leasing module; this crate only reads them through
//! [`LeaseHierarchy`].

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::DbId;

/// Display data for a single hierarchy scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeInfo {
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
}

/// A flat hierarchy row as returned by the batch tree query.
///
/// `parent` is `None` only for customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyEntry {
    pub scope: ScopeRef,
    pub parent: Option<ScopeRef>,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
}

/// The position of a car (or any scope) in the hierarchy, general to specific.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPath {
    pub customer_id: Option<DbId>,
    pub master_lease_id: Option<DbId>,
    pub rider_id: Option<DbId>,
    pub amendment_id: Option<DbId>,
}

impl HierarchyPath {
    pub fn id_at(&self, level: ScopeLevel) -> Option<DbId> {
        match level {
            ScopeLevel::Customer => self.customer_id,
            ScopeLevel::MasterLease => self.master_lease_id,
            ScopeLevel::Rider => self.rider_id,
            ScopeLevel::Amendment => self.amendment_id,
        }
    }

    fn set(&mut self, scope: ScopeRef) {
        let slot = match scope.level {
            ScopeLevel::Customer => &mut self.customer_id,
            ScopeLevel::MasterLease => &mut self.master_lease_id,
            ScopeLevel::Rider => &mut self.rider_id,
            ScopeLevel::Amendment => &mut self.amendment_id,
        };
        *slot = Some(scope.id);
    }

    /// Scopes present in the path, in merge walk order.
    pub fn scopes(&self) -> Vec<ScopeRef> {
        ScopeLevel::ALL
            .iter()
            .filter_map(|&level| self.id_at(level).map(|id| ScopeRef::new(level, id)))
            .collect()
    }
}

/// Lookup collaborator for the lease hierarchy.
pub trait LeaseHierarchy: Send + Sync {
    /// Display name and active flag for a scope, or `None` if it does not exist.
    fn scope_info(
        &self,
        scope: ScopeRef,
    ) -> impl Future<Output = Result<Option<ScopeInfo>, CoreError>> + Send;

    /// The direct owner of a scope. Amendments report their rider when
    /// attached to one, otherwise their master lease. Customers have none.
    fn parent_of(
        &self,
        scope: ScopeRef,
    ) -> impl Future<Output = Result<Option<ScopeRef>, CoreError>> + Send;

    /// Where `car_number` sits as of `as_of`, or `None` if it is not on any rider.
    fn car_placement(
        &self,
        car_number: &str,
        as_of: NaiveDate,
    ) -> impl Future<Output = Result<Option<HierarchyPath>, CoreError>> + Send;

    /// Every hierarchy row, optionally restricted to one customer's subtree.
    fn list_entries(
        &self,
        customer_id: Option<DbId>,
    ) -> impl Future<Output = Result<Vec<HierarchyEntry>, CoreError>> + Send;
}

/// Build the path from the customer down to `scope` by climbing parents.
pub async fn path_for_scope<H: LeaseHierarchy>(
    hierarchy: &H,
    scope: ScopeRef,
) -> Result<HierarchyPath, CoreError> {
    if hierarchy.scope_info(scope).await?.is_none() {
        return Err(CoreError::ScopeNotFound {
            level: scope.level,
            id: scope.id,
        });
    }

    let mut path = HierarchyPath::default();
    let mut current = Some(scope);
    // Each hop moves to a strictly more general level, so at most four hops.
    for _ in 0..ScopeLevel::ALL.len() {
        let Some(step) = current else { break };
        path.set(step);
        current = match hierarchy.parent_of(step).await? {
            Some(parent) if parent.level < step.level => Some(parent),
            _ => None,
        };
    }
    Ok(path)
}
