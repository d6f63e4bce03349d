//! CCM instruction row model.

use ccm_core::ccm::types::{CcmFields, CcmInstruction};
use ccm_core::error::CoreError;
use ccm_core::scope::ScopeLevel;
use ccm_core::types::{DbId, Timestamp};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// A row from the `ccm_instructions` table, before the scope type is parsed.
///
/// The 24 field columns are read by name from the `CcmFields` name tables,
/// so adding a field only touches the core macro and the migration.
#[derive(Debug, Clone)]
pub struct CcmInstructionRow {
    pub id: DbId,
    pub scope_type: String,
    pub scope_id: DbId,
    pub scope_name: String,
    pub fields: CcmFields,
    pub version: i32,
    pub is_current: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for CcmInstructionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut fields = CcmFields::default();
        for name in CcmFields::BOOL_NAMES {
            fields.set_bool(name, row.try_get::<Option<bool>, _>(*name)?);
        }
        for name in CcmFields::TEXT_NAMES {
            fields.set_text(name, row.try_get::<Option<String>, _>(*name)?);
        }

        Ok(Self {
            id: row.try_get("id")?,
            scope_type: row.try_get("scope_type")?,
            scope_id: row.try_get("scope_id")?,
            scope_name: row.try_get("scope_name")?,
            fields,
            version: row.try_get("version")?,
            is_current: row.try_get("is_current")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<CcmInstructionRow> for CcmInstruction {
    type Error = CoreError;

    fn try_from(row: CcmInstructionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            scope_type: ScopeLevel::parse(&row.scope_type)?,
            scope_id: row.scope_id,
            scope_name: row.scope_name,
            fields: row.fields,
            version: row.version,
            is_current: row.is_current,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `(scope_type, scope_id)` of a current instruction.
#[derive(Debug, Clone, FromRow)]
pub struct CurrentScopeRow {
    pub scope_type: String,
    pub scope_id: DbId,
}
