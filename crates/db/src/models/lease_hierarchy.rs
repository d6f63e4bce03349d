//! Read models for the lease hierarchy tables.

use ccm_core::hierarchy::{HierarchyEntry, HierarchyPath, ScopeInfo};
use ccm_core::scope::ScopeRef;
use ccm_core::types::DbId;
use sqlx::FromRow;

/// Display data for one scope.
#[derive(Debug, Clone, FromRow)]
pub struct ScopeInfoRow {
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
}

impl From<ScopeInfoRow> for ScopeInfo {
    fn from(row: ScopeInfoRow) -> Self {
        Self {
            name: row.name,
            code: row.code,
            is_active: row.is_active,
        }
    }
}

/// One row of a per-level tree query. `parent_id` is the owning row in the
/// next more general level (for amendments, the rider when attached).
#[derive(Debug, Clone, FromRow)]
pub struct HierarchyEntryRow {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
}

impl HierarchyEntryRow {
    pub fn into_entry(
        self,
        scope: impl Fn(DbId) -> ScopeRef,
        parent: impl Fn(DbId) -> ScopeRef,
    ) -> HierarchyEntry {
        HierarchyEntry {
            scope: scope(self.id),
            parent: self.parent_id.map(parent),
            name: self.name,
            code: self.code,
            is_active: self.is_active,
        }
    }
}

/// An amendment row for the tree query, which can hang off a rider or a lease.
#[derive(Debug, Clone, FromRow)]
pub struct AmendmentEntryRow {
    pub id: DbId,
    pub master_lease_id: DbId,
    pub rider_id: Option<DbId>,
    pub name: String,
    pub code: Option<String>,
    pub is_active: bool,
}

impl From<AmendmentEntryRow> for HierarchyEntry {
    fn from(row: AmendmentEntryRow) -> Self {
        let parent = match row.rider_id {
            Some(rider_id) => ScopeRef::rider(rider_id),
            None => ScopeRef::master_lease(row.master_lease_id),
        };
        Self {
            scope: ScopeRef::amendment(row.id),
            parent: Some(parent),
            name: row.name,
            code: row.code,
            is_active: row.is_active,
        }
    }
}

/// A car's resolved placement.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CarPlacementRow {
    pub customer_id: Option<DbId>,
    pub master_lease_id: Option<DbId>,
    pub rider_id: Option<DbId>,
    pub amendment_id: Option<DbId>,
}

impl From<CarPlacementRow> for HierarchyPath {
    fn from(row: CarPlacementRow) -> Self {
        Self {
            customer_id: row.customer_id,
            master_lease_id: row.master_lease_id,
            rider_id: row.rider_id,
            amendment_id: row.amendment_id,
        }
    }
}
