//! Sealing and lining section row models.

use ccm_core::ccm::types::{LiningSection, SealingSection};
use ccm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `ccm_sealing_sections` table.
#[derive(Debug, Clone, FromRow)]
pub struct SealingSectionRow {
    pub id: DbId,
    pub ccm_instruction_id: DbId,
    pub commodity: String,
    pub gasket_material: Option<String>,
    pub o_ring_material: Option<String>,
    pub sealing_notes: Option<String>,
    pub sort_order: i32,
    pub inherit_from_parent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SealingSectionRow> for SealingSection {
    fn from(row: SealingSectionRow) -> Self {
        Self {
            id: row.id,
            ccm_instruction_id: row.ccm_instruction_id,
            commodity: row.commodity,
            gasket_material: row.gasket_material,
            o_ring_material: row.o_ring_material,
            sealing_notes: row.sealing_notes,
            sort_order: row.sort_order,
            inherit_from_parent: row.inherit_from_parent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `ccm_lining_sections` table.
#[derive(Debug, Clone, FromRow)]
pub struct LiningSectionRow {
    pub id: DbId,
    pub ccm_instruction_id: DbId,
    pub commodity: String,
    pub lining_required: Option<bool>,
    pub lining_type: Option<String>,
    pub lining_notes: Option<String>,
    pub sort_order: i32,
    pub inherit_from_parent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<LiningSectionRow> for LiningSection {
    fn from(row: LiningSectionRow) -> Self {
        Self {
            id: row.id,
            ccm_instruction_id: row.ccm_instruction_id,
            commodity: row.commodity,
            lining_required: row.lining_required,
            lining_type: row.lining_type,
            lining_notes: row.lining_notes,
            sort_order: row.sort_order,
            inherit_from_parent: row.inherit_from_parent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
