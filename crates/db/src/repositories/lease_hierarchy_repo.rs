//! Read-only queries over the lease hierarchy tables.
//!
//! The hierarchy is owned elsewhere; CCM only needs names, parent links,
//! car placement, and a flat listing for the scope tree.

use ccm_core::hierarchy::HierarchyEntry;
use ccm_core::scope::{ScopeLevel, ScopeRef};
use ccm_core::types::DbId;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::lease_hierarchy::{
    AmendmentEntryRow, CarPlacementRow, HierarchyEntryRow, ScopeInfoRow,
};

/// Resolve a car to its rider as of a date, then pick the amendment in
/// force: one attached to that rider wins over one attached to the lease,
/// and within each the latest effective date wins.
const CAR_PLACEMENT_QUERY: &str = "\
    SELECT ml.customer_id, ml.id AS master_lease_id, lr.id AS rider_id, la.id AS amendment_id \
    FROM cars c \
    JOIN rider_cars rc ON rc.car_id = c.id \
    JOIN lease_riders lr ON lr.id = rc.rider_id \
    JOIN master_leases ml ON ml.id = lr.master_lease_id \
    LEFT JOIN LATERAL ( \
        SELECT a.id FROM lease_amendments a \
        WHERE a.is_active \
          AND a.effective_date <= $2 \
          AND (a.rider_id = lr.id OR (a.rider_id IS NULL AND a.master_lease_id = ml.id)) \
        ORDER BY (a.rider_id IS NOT NULL) DESC, a.effective_date DESC, a.id DESC \
        LIMIT 1 \
    ) la ON true \
    WHERE c.car_number = $1 \
      AND rc.added_date <= $2 \
      AND (rc.removed_date IS NULL OR rc.removed_date > $2) \
    ORDER BY rc.added_date DESC, rc.id DESC \
    LIMIT 1";

/// Provides read access to customers, leases, riders, amendments, and car placement.
pub struct LeaseHierarchyRepo;

impl LeaseHierarchyRepo {
    /// Display name, code, and active flag for a scope.
    pub async fn scope_info(
        pool: &PgPool,
        scope: ScopeRef,
    ) -> Result<Option<ScopeInfoRow>, sqlx::Error> {
        let query = match scope.level {
            ScopeLevel::Customer => {
                "SELECT customer_name AS name, customer_code AS code, is_active \
                 FROM customers WHERE id = $1"
            }
            ScopeLevel::MasterLease => {
                "SELECT COALESCE(lease_name, lease_number) AS name, lease_number AS code, is_active \
                 FROM master_leases WHERE id = $1"
            }
            ScopeLevel::Rider => {
                "SELECT COALESCE(rider_name, rider_number) AS name, rider_number AS code, is_active \
                 FROM lease_riders WHERE id = $1"
            }
            ScopeLevel::Amendment => {
                "SELECT COALESCE(amendment_name, amendment_number) AS name, \
                        amendment_number AS code, is_active \
                 FROM lease_amendments WHERE id = $1"
            }
        };
        sqlx::query_as::<_, ScopeInfoRow>(query)
            .bind(scope.id)
            .fetch_optional(pool)
            .await
    }

    /// The owning scope one level up. Amendments report their rider if set.
    pub async fn parent_of(
        pool: &PgPool,
        scope: ScopeRef,
    ) -> Result<Option<ScopeRef>, sqlx::Error> {
        match scope.level {
            ScopeLevel::Customer => Ok(None),
            ScopeLevel::MasterLease => {
                let row: Option<(DbId,)> =
                    sqlx::query_as("SELECT customer_id FROM master_leases WHERE id = $1")
                        .bind(scope.id)
                        .fetch_optional(pool)
                        .await?;
                Ok(row.map(|(id,)| ScopeRef::customer(id)))
            }
            ScopeLevel::Rider => {
                let row: Option<(DbId,)> =
                    sqlx::query_as("SELECT master_lease_id FROM lease_riders WHERE id = $1")
                        .bind(scope.id)
                        .fetch_optional(pool)
                        .await?;
                Ok(row.map(|(id,)| ScopeRef::master_lease(id)))
            }
            ScopeLevel::Amendment => {
                let row: Option<(DbId, Option<DbId>)> = sqlx::query_as(
                    "SELECT master_lease_id, rider_id FROM lease_amendments WHERE id = $1",
                )
                .bind(scope.id)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(|(lease_id, rider_id)| match rider_id {
                    Some(rider_id) => ScopeRef::rider(rider_id),
                    None => ScopeRef::master_lease(lease_id),
                }))
            }
        }
    }

    /// Where a car sits as of `as_of`, or `None` if it is on no rider.
    pub async fn car_placement(
        pool: &PgPool,
        car_number: &str,
        as_of: NaiveDate,
    ) -> Result<Option<CarPlacementRow>, sqlx::Error> {
        sqlx::query_as::<_, CarPlacementRow>(CAR_PLACEMENT_QUERY)
            .bind(car_number)
            .bind(as_of)
            .fetch_optional(pool)
            .await
    }

    /// Flat hierarchy rows ordered by level then id, optionally for one customer.
    pub async fn list_entries(
        pool: &PgPool,
        customer_id: Option<DbId>,
    ) -> Result<Vec<HierarchyEntry>, sqlx::Error> {
        let customers = sqlx::query_as::<_, HierarchyEntryRow>(
            "SELECT id, NULL::BIGINT AS parent_id, customer_name AS name, \
                    customer_code AS code, is_active \
             FROM customers \
             WHERE ($1::BIGINT IS NULL OR id = $1) \
             ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        let leases = sqlx::query_as::<_, HierarchyEntryRow>(
            "SELECT id, customer_id AS parent_id, COALESCE(lease_name, lease_number) AS name, \
                    lease_number AS code, is_active \
             FROM master_leases \
             WHERE ($1::BIGINT IS NULL OR customer_id = $1) \
             ORDER BY id",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        let riders = sqlx::query_as::<_, HierarchyEntryRow>(
            "SELECT lr.id, lr.master_lease_id AS parent_id, \
                    COALESCE(lr.rider_name, lr.rider_number) AS name, \
                    lr.rider_number AS code, lr.is_active \
             FROM lease_riders lr \
             JOIN master_leases ml ON ml.id = lr.master_lease_id \
             WHERE ($1::BIGINT IS NULL OR ml.customer_id = $1) \
             ORDER BY lr.id",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        let amendments = sqlx::query_as::<_, AmendmentEntryRow>(
            "SELECT la.id, la.master_lease_id, la.rider_id, \
                    COALESCE(la.amendment_name, la.amendment_number) AS name, \
                    la.amendment_number AS code, la.is_active \
             FROM lease_amendments la \
             JOIN master_leases ml ON ml.id = la.master_lease_id \
             WHERE ($1::BIGINT IS NULL OR ml.customer_id = $1) \
             ORDER BY la.id",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        let mut entries =
            Vec::with_capacity(customers.len() + leases.len() + riders.len() + amendments.len());
        entries.extend(
            customers
                .into_iter()
                .map(|r| r.into_entry(ScopeRef::customer, ScopeRef::customer)),
        );
        entries.extend(
            leases
                .into_iter()
                .map(|r| r.into_entry(ScopeRef::master_lease, ScopeRef::customer)),
        );
        entries.extend(
            riders
                .into_iter()
                .map(|r| r.into_entry(ScopeRef::rider, ScopeRef::master_lease)),
        );
        entries.extend(amendments.into_iter().map(HierarchyEntry::from));
        Ok(entries)
    }
}
