//! [`CcmStore`] backed by PostgreSQL.

use ccm_core::ccm::store::CcmStore;
use ccm_core::ccm::types::{
    CcmFields, CcmInstruction, CcmInstructionWithSections, CreateLiningSection,
    CreateSealingSection, InstructionQuery, LiningSection, NewCcmInstruction, SealingSection,
    UpdateLiningSection, UpdateSealingSection,
};
use ccm_core::error::CoreError;
use ccm_core::scope::{ScopeLevel, ScopeRef};
use ccm_core::types::DbId;
use sqlx::PgPool;

use crate::error::into_core;
use crate::models::ccm_instruction::CcmInstructionRow;
use crate::repositories::{CcmInstructionRepo, CcmLiningRepo, CcmSealingRepo};

/// Instruction store over a connection pool.
#[derive(Debug, Clone)]
pub struct PgCcmStore {
    pool: PgPool,
}

impl PgCcmStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_sections(
        &self,
        row: CcmInstructionRow,
    ) -> Result<CcmInstructionWithSections, CoreError> {
        let sealing = CcmSealingRepo::list_for_instruction(&self.pool, row.id)
            .await
            .map_err(into_core)?;
        let lining = CcmLiningRepo::list_for_instruction(&self.pool, row.id)
            .await
            .map_err(into_core)?;
        Ok(CcmInstructionWithSections {
            instruction: row.try_into()?,
            sealing: sealing.into_iter().map(SealingSection::from).collect(),
            lining: lining.into_iter().map(LiningSection::from).collect(),
        })
    }
}

fn into_instructions(rows: Vec<CcmInstructionRow>) -> Result<Vec<CcmInstruction>, CoreError> {
    rows.into_iter().map(CcmInstruction::try_from).collect()
}

impl CcmStore for PgCcmStore {
    async fn find_current(
        &self,
        scope: ScopeRef,
    ) -> Result<Option<CcmInstructionWithSections>, CoreError> {
        let row = CcmInstructionRepo::find_current(&self.pool, scope.level.as_str(), scope.id)
            .await
            .map_err(into_core)?;
        match row {
            Some(row) => Ok(Some(self.with_sections(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<CcmInstructionWithSections>, CoreError> {
        let row = CcmInstructionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(into_core)?;
        match row {
            Some(row) => Ok(Some(self.with_sections(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_include_inactive(
        &self,
        id: DbId,
    ) -> Result<Option<CcmInstruction>, CoreError> {
        CcmInstructionRepo::find_by_id_include_inactive(&self.pool, id)
            .await
            .map_err(into_core)?
            .map(CcmInstruction::try_from)
            .transpose()
    }

    async fn list(&self, query: InstructionQuery) -> Result<Vec<CcmInstruction>, CoreError> {
        let rows = CcmInstructionRepo::list(
            &self.pool,
            query.scope_type.map(|level| level.as_str()),
            query.scope_id,
            query.include_inactive,
        )
        .await
        .map_err(into_core)?;
        into_instructions(rows)
    }

    async fn history(&self, scope: ScopeRef) -> Result<Vec<CcmInstruction>, CoreError> {
        let rows = CcmInstructionRepo::history(&self.pool, scope.level.as_str(), scope.id)
            .await
            .map_err(into_core)?;
        into_instructions(rows)
    }

    async fn current_scopes(&self) -> Result<Vec<ScopeRef>, CoreError> {
        CcmInstructionRepo::current_scopes(&self.pool)
            .await
            .map_err(into_core)?
            .into_iter()
            .map(|row| {
                ScopeLevel::parse(&row.scope_type).map(|level| ScopeRef::new(level, row.scope_id))
            })
            .collect()
    }

    async fn insert(
        &self,
        input: NewCcmInstruction,
    ) -> Result<CcmInstructionWithSections, CoreError> {
        let created = CcmInstructionRepo::create(&self.pool, &input)
            .await
            .map_err(into_core)?;
        Ok(CcmInstructionWithSections {
            instruction: created.instruction.try_into()?,
            sealing: created.sealing.into_iter().map(SealingSection::from).collect(),
            lining: created.lining.into_iter().map(LiningSection::from).collect(),
        })
    }

    async fn update(
        &self,
        id: DbId,
        patch: &CcmFields,
    ) -> Result<Option<CcmInstruction>, CoreError> {
        CcmInstructionRepo::update(&self.pool, id, patch)
            .await
            .map_err(into_core)?
            .map(CcmInstruction::try_from)
            .transpose()
    }

    async fn soft_delete(&self, id: DbId) -> Result<bool, CoreError> {
        CcmInstructionRepo::soft_delete(&self.pool, id)
            .await
            .map_err(into_core)
    }

    async fn insert_sealing(
        &self,
        instruction_id: DbId,
        input: &CreateSealingSection,
    ) -> Result<Option<SealingSection>, CoreError> {
        let row = CcmSealingRepo::create(&self.pool, instruction_id, input)
            .await
            .map_err(into_core)?;
        Ok(row.map(SealingSection::from))
    }

    async fn update_sealing(
        &self,
        id: DbId,
        input: &UpdateSealingSection,
    ) -> Result<Option<SealingSection>, CoreError> {
        let row = CcmSealingRepo::update(&self.pool, id, input)
            .await
            .map_err(into_core)?;
        Ok(row.map(SealingSection::from))
    }

    async fn delete_sealing(&self, id: DbId) -> Result<bool, CoreError> {
        CcmSealingRepo::delete(&self.pool, id)
            .await
            .map_err(into_core)
    }

    async fn insert_lining(
        &self,
        instruction_id: DbId,
        input: &CreateLiningSection,
    ) -> Result<Option<LiningSection>, CoreError> {
        let row = CcmLiningRepo::create(&self.pool, instruction_id, input)
            .await
            .map_err(into_core)?;
        Ok(row.map(LiningSection::from))
    }

    async fn update_lining(
        &self,
        id: DbId,
        input: &UpdateLiningSection,
    ) -> Result<Option<LiningSection>, CoreError> {
        let row = CcmLiningRepo::update(&self.pool, id, input)
            .await
            .map_err(into_core)?;
        Ok(row.map(LiningSection::from))
    }

    async fn delete_lining(&self, id: DbId) -> Result<bool, CoreError> {
        CcmLiningRepo::delete(&self.pool, id)
            .await
            .map_err(into_core)
    }
}
