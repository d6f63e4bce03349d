//! Repository for the `ccm_instructions` table.
//!
//! One current row per `(scope_type, scope_id)`, enforced by the partial
//! unique index `uq_ccm_instructions_current_scope`. Soft delete flips
//! `is_current`; history rows are never removed.

use std::sync::LazyLock;

use ccm_core::ccm::types::{CcmFields, FieldSlot, NewCcmInstruction};
use ccm_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::models::ccm_instruction::{CcmInstructionRow, CurrentScopeRow};
use crate::models::ccm_section::{LiningSectionRow, SealingSectionRow};
use crate::repositories::ccm_section_repo::{CcmLiningRepo, CcmSealingRepo};

/// Column list shared across queries, built from the field name table.
static COLUMNS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "id, scope_type, scope_id, scope_name, {}, version, is_current, created_by, created_at, updated_at",
        CcmFields::NAMES.join(", ")
    )
});

/// Number of leading non-field parameters in the INSERT statement.
const INSERT_FIXED_PARAMS: usize = 4;

/// Bind every field slot, in name-table order, onto `query`.
fn bind_fields<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    fields: &'q CcmFields,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for slot in fields.slots() {
        query = match slot {
            FieldSlot::Bool(value) => query.bind(value),
            FieldSlot::Text(value) => query.bind(value),
        };
    }
    query
}

/// An inserted instruction with the sections created alongside it.
#[derive(Debug, Clone)]
pub struct CreatedInstructionRows {
    pub instruction: CcmInstructionRow,
    pub sealing: Vec<SealingSectionRow>,
    pub lining: Vec<LiningSectionRow>,
}

/// Provides data access for CCM instructions.
pub struct CcmInstructionRepo;

impl CcmInstructionRepo {
    /// Insert a current instruction and its initial sections in one transaction.
    ///
    /// `version` is one more than the highest version previously stored for
    /// the scope, so a re-created scope starts a new generation.
    pub async fn create(
        pool: &PgPool,
        input: &NewCcmInstruction,
    ) -> Result<CreatedInstructionRows, sqlx::Error> {
        let placeholders: Vec<String> = (0..CcmFields::NAMES.len())
            .map(|i| format!("${}", i + INSERT_FIXED_PARAMS + 1))
            .collect();
        let query = format!(
            "INSERT INTO ccm_instructions \
                (scope_type, scope_id, scope_name, created_by, version, {fields}) \
             VALUES ($1, $2, $3, $4, \
                (SELECT COALESCE(MAX(version), 0) + 1 FROM ccm_instructions \
                 WHERE scope_type = $1 AND scope_id = $2), \
                {placeholders}) \
             RETURNING {columns}",
            fields = CcmFields::NAMES.join(", "),
            placeholders = placeholders.join(", "),
            columns = *COLUMNS,
        );

        let mut tx = pool.begin().await?;

        let insert = sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(input.scope.level.as_str())
            .bind(input.scope.id)
            .bind(&input.scope_name)
            .bind(input.created_by);
        let instruction = bind_fields(insert, &input.fields)
            .fetch_one(&mut *tx)
            .await?;

        let mut sealing = Vec::with_capacity(input.sealing.len());
        for section in &input.sealing {
            if let Some(row) = CcmSealingRepo::create(&mut *tx, instruction.id, section).await? {
                sealing.push(row);
            }
        }
        let mut lining = Vec::with_capacity(input.lining.len());
        for section in &input.lining {
            if let Some(row) = CcmLiningRepo::create(&mut *tx, instruction.id, section).await? {
                lining.push(row);
            }
        }

        tx.commit().await?;
        Ok(CreatedInstructionRows {
            instruction,
            sealing,
            lining,
        })
    }

    /// Find the current instruction for a scope.
    pub async fn find_current(
        pool: &PgPool,
        scope_type: &str,
        scope_id: DbId,
    ) -> Result<Option<CcmInstructionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM ccm_instructions \
             WHERE scope_type = $1 AND scope_id = $2 AND is_current",
            *COLUMNS
        );
        sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(scope_type)
            .bind(scope_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instruction by ID. Excludes superseded rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CcmInstructionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM ccm_instructions WHERE id = $1 AND is_current",
            *COLUMNS
        );
        sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instruction by ID, including superseded rows.
    pub async fn find_by_id_include_inactive(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CcmInstructionRow>, sqlx::Error> {
        let query = format!("SELECT {} FROM ccm_instructions WHERE id = $1", *COLUMNS);
        sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List instructions, newest first, optionally filtered by scope.
    pub async fn list(
        pool: &PgPool,
        scope_type: Option<&str>,
        scope_id: Option<DbId>,
        include_inactive: bool,
    ) -> Result<Vec<CcmInstructionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM ccm_instructions \
             WHERE ($1::TEXT IS NULL OR scope_type = $1) \
               AND ($2::BIGINT IS NULL OR scope_id = $2) \
               AND ($3 OR is_current) \
             ORDER BY created_at DESC, id DESC",
            *COLUMNS
        );
        sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(scope_type)
            .bind(scope_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Every instruction ever created for a scope, newest generation first.
    pub async fn history(
        pool: &PgPool,
        scope_type: &str,
        scope_id: DbId,
    ) -> Result<Vec<CcmInstructionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM ccm_instructions \
             WHERE scope_type = $1 AND scope_id = $2 \
             ORDER BY version DESC, id DESC",
            *COLUMNS
        );
        sqlx::query_as::<_, CcmInstructionRow>(&query)
            .bind(scope_type)
            .bind(scope_id)
            .fetch_all(pool)
            .await
    }

    /// Scopes that currently carry an instruction.
    pub async fn current_scopes(pool: &PgPool) -> Result<Vec<CurrentScopeRow>, sqlx::Error> {
        sqlx::query_as::<_, CurrentScopeRow>(
            "SELECT scope_type, scope_id FROM ccm_instructions WHERE is_current",
        )
        .fetch_all(pool)
        .await
    }

    /// Update an instruction. Only non-`None` fields in `patch` are applied;
    /// `version` is left untouched.
    ///
    /// Returns `None` if no current row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &CcmFields,
    ) -> Result<Option<CcmInstructionRow>, sqlx::Error> {
        let assignments: Vec<String> = CcmFields::NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name} = COALESCE(${}, {name})", i + 2))
            .collect();
        let query = format!(
            "UPDATE ccm_instructions SET {}, updated_at = NOW() \
             WHERE id = $1 AND is_current \
             RETURNING {}",
            assignments.join(", "),
            *COLUMNS
        );
        let update = sqlx::query_as::<_, CcmInstructionRow>(&query).bind(id);
        bind_fields(update, patch).fetch_optional(pool).await
    }

    /// Mark an instruction as no longer current. Returns `true` if a row changed.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ccm_instructions SET is_current = false, updated_at = NOW() \
             WHERE id = $1 AND is_current",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
