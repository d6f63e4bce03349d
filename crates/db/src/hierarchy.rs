//! [`LeaseHierarchy`] backed by the PostgreSQL hierarchy tables.

use ccm_core::error::CoreError;
use ccm_core::hierarchy::{HierarchyEntry, HierarchyPath, LeaseHierarchy, ScopeInfo};
use ccm_core::scope::ScopeRef;
use ccm_core::types::DbId;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::into_core;
use crate::repositories::LeaseHierarchyRepo;

#[derive(Debug, Clone)]
pub struct PgLeaseHierarchy {
    pool: PgPool,
}

impl PgLeaseHierarchy {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LeaseHierarchy for PgLeaseHierarchy {
    async fn scope_info(&self, scope: ScopeRef) -> Result<Option<ScopeInfo>, CoreError> {
        let row = LeaseHierarchyRepo::scope_info(&self.pool, scope)
            .await
            .map_err(into_core)?;
        Ok(row.map(ScopeInfo::from))
    }

    async fn parent_of(&self, scope: ScopeRef) -> Result<Option<ScopeRef>, CoreError> {
        LeaseHierarchyRepo::parent_of(&self.pool, scope)
            .await
            .map_err(into_core)
    }

    async fn car_placement(
        &self,
        car_number: &str,
        as_of: NaiveDate,
    ) -> Result<Option<HierarchyPath>, CoreError> {
        let row = LeaseHierarchyRepo::car_placement(&self.pool, car_number, as_of)
            .await
            .map_err(into_core)?;
        Ok(row.map(HierarchyPath::from))
    }

    async fn list_entries(
        &self,
        customer_id: Option<DbId>,
    ) -> Result<Vec<HierarchyEntry>, CoreError> {
        LeaseHierarchyRepo::list_entries(&self.pool, customer_id)
            .await
            .map_err(into_core)
    }
}
