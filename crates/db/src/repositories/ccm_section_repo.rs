//! Repositories for the `ccm_sealing_sections` and `ccm_lining_sections` tables.
//!
//! Sections can only be written under a current instruction; every write is
//! guarded in SQL so the check and the write happen in one statement.

use ccm_core::ccm::types::{
    CreateLiningSection, CreateSealingSection, UpdateLiningSection, UpdateSealingSection,
};
use ccm_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::ccm_section::{LiningSectionRow, SealingSectionRow};

/// Column list for `ccm_sealing_sections` queries.
const SEALING_COLUMNS: &str = "id, ccm_instruction_id, commodity, gasket_material, \
    o_ring_material, sealing_notes, sort_order, inherit_from_parent, created_at, updated_at";

/// Column list for `ccm_lining_sections` queries.
const LINING_COLUMNS: &str = "id, ccm_instruction_id, commodity, lining_required, \
    lining_type, lining_notes, sort_order, inherit_from_parent, created_at, updated_at";

/// Provides data access for sealing sections.
pub struct CcmSealingRepo;

impl CcmSealingRepo {
    /// Insert a section under a current instruction.
    ///
    /// Returns `None` if the instruction is missing or no longer current.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        instruction_id: DbId,
        input: &CreateSealingSection,
    ) -> Result<Option<SealingSectionRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO ccm_sealing_sections \
                (ccm_instruction_id, commodity, gasket_material, o_ring_material, \
                 sealing_notes, sort_order, inherit_from_parent) \
             SELECT $1::BIGINT, $2::TEXT, $3::TEXT, $4::TEXT, $5::TEXT, \
                    COALESCE($6::INTEGER, 0), COALESCE($7::BOOLEAN, false) \
             WHERE EXISTS ( \
                SELECT 1 FROM ccm_instructions WHERE id = $1 AND is_current \
             ) \
             RETURNING {SEALING_COLUMNS}"
        );
        sqlx::query_as::<_, SealingSectionRow>(&query)
            .bind(instruction_id)
            .bind(&input.commodity)
            .bind(&input.gasket_material)
            .bind(&input.o_ring_material)
            .bind(&input.sealing_notes)
            .bind(input.sort_order)
            .bind(input.inherit_from_parent)
            .fetch_optional(executor)
            .await
    }

    /// Sections of an instruction in evaluation order.
    pub async fn list_for_instruction(
        pool: &PgPool,
        instruction_id: DbId,
    ) -> Result<Vec<SealingSectionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {SEALING_COLUMNS} FROM ccm_sealing_sections \
             WHERE ccm_instruction_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, SealingSectionRow>(&query)
            .bind(instruction_id)
            .fetch_all(pool)
            .await
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    ///
    /// Sections of a retired instruction are frozen; returns `None` for them.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSealingSection,
    ) -> Result<Option<SealingSectionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE ccm_sealing_sections SET \
                commodity = COALESCE($2, commodity), \
                gasket_material = COALESCE($3, gasket_material), \
                o_ring_material = COALESCE($4, o_ring_material), \
                sealing_notes = COALESCE($5, sealing_notes), \
                sort_order = COALESCE($6, sort_order), \
                inherit_from_parent = COALESCE($7, inherit_from_parent), \
                updated_at = NOW() \
             WHERE id = $1 \
               AND EXISTS ( \
                SELECT 1 FROM ccm_instructions i \
                WHERE i.id = ccm_instruction_id AND i.is_current \
               ) \
             RETURNING {SEALING_COLUMNS}"
        );
        sqlx::query_as::<_, SealingSectionRow>(&query)
            .bind(id)
            .bind(&input.commodity)
            .bind(&input.gasket_material)
            .bind(&input.o_ring_material)
            .bind(&input.sealing_notes)
            .bind(input.sort_order)
            .bind(input.inherit_from_parent)
            .fetch_optional(pool)
            .await
    }

    /// Delete a section under a current instruction. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM ccm_sealing_sections \
             WHERE id = $1 \
               AND EXISTS ( \
                SELECT 1 FROM ccm_instructions i \
                WHERE i.id = ccm_instruction_id AND i.is_current \
               )",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides data access for lining sections.
pub struct CcmLiningRepo;

impl CcmLiningRepo {
    /// Insert a section under a current instruction.
    ///
    /// Returns `None` if the instruction is missing or no longer current.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        instruction_id: DbId,
        input: &CreateLiningSection,
    ) -> Result<Option<LiningSectionRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO ccm_lining_sections \
                (ccm_instruction_id, commodity, lining_required, lining_type, \
                 lining_notes, sort_order, inherit_from_parent) \
             SELECT $1::BIGINT, $2::TEXT, $3::BOOLEAN, $4::TEXT, $5::TEXT, \
                    COALESCE($6::INTEGER, 0), COALESCE($7::BOOLEAN, false) \
             WHERE EXISTS ( \
                SELECT 1 FROM ccm_instructions WHERE id = $1 AND is_current \
             ) \
             RETURNING {LINING_COLUMNS}"
        );
        sqlx::query_as::<_, LiningSectionRow>(&query)
            .bind(instruction_id)
            .bind(&input.commodity)
            .bind(input.lining_required)
            .bind(&input.lining_type)
            .bind(&input.lining_notes)
            .bind(input.sort_order)
            .bind(input.inherit_from_parent)
            .fetch_optional(executor)
            .await
    }

    /// Sections of an instruction in evaluation order.
    pub async fn list_for_instruction(
        pool: &PgPool,
        instruction_id: DbId,
    ) -> Result<Vec<LiningSectionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LINING_COLUMNS} FROM ccm_lining_sections \
             WHERE ccm_instruction_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, LiningSectionRow>(&query)
            .bind(instruction_id)
            .fetch_all(pool)
            .await
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    ///
    /// Sections of a retired instruction are frozen; returns `None` for them.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLiningSection,
    ) -> Result<Option<LiningSectionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE ccm_lining_sections SET \
                commodity = COALESCE($2, commodity), \
                lining_required = COALESCE($3, lining_required), \
                lining_type = COALESCE($4, lining_type), \
                lining_notes = COALESCE($5, lining_notes), \
                sort_order = COALESCE($6, sort_order), \
                inherit_from_parent = COALESCE($7, inherit_from_parent), \
                updated_at = NOW() \
             WHERE id = $1 \
               AND EXISTS ( \
                SELECT 1 FROM ccm_instructions i \
                WHERE i.id = ccm_instruction_id AND i.is_current \
               ) \
             RETURNING {LINING_COLUMNS}"
        );
        sqlx::query_as::<_, LiningSectionRow>(&query)
            .bind(id)
            .bind(&input.commodity)
            .bind(input.lining_required)
            .bind(&input.lining_type)
            .bind(&input.lining_notes)
            .bind(input.sort_order)
            .bind(input.inherit_from_parent)
            .fetch_optional(pool)
            .await
    }

    /// Delete a section under a current instruction. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM ccm_lining_sections \
             WHERE id = $1 \
               AND EXISTS ( \
                SELECT 1 FROM ccm_instructions i \
                WHERE i.id = ccm_instruction_id AND i.is_current \
               )",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
