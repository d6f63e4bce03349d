//! Instruction store: the persistence trait and the operations built on it.
//!
//! [`CcmStore`] is pure data access. The free functions in this module add
//! the checks that sit above it: scope-type parsing, scope-name resolution
//! before insert, commodity validation, and not-found mapping.

use std::future::Future;

use crate::ccm::types::{
    CcmFields, CcmInstruction, CcmInstructionFilter, CcmInstructionWithSections,
    CreateCcmInstruction, CreateLiningSection, CreateSealingSection, InstructionQuery,
    LiningSection, NewCcmInstruction, SealingSection, UpdateLiningSection,
    UpdateSealingSection,
};
use crate::error::CoreError;
use crate::hierarchy::LeaseHierarchy;
use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::DbId;

/// Maximum length for a commodity name.
pub const MAX_COMMODITY_LEN: usize = 200;

/// Persistence collaborator for instructions and their sections.
///
/// Lookups by id or scope only see current records unless the method name
/// says otherwise.
pub trait CcmStore: Send + Sync {
    fn find_current(
        &self,
        scope: ScopeRef,
    ) -> impl Future<Output = Result<Option<CcmInstructionWithSections>, CoreError>> + Send;

    fn find_by_id(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<CcmInstructionWithSections>, CoreError>> + Send;

    fn find_by_id_include_inactive(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<CcmInstruction>, CoreError>> + Send;

    fn list(
        &self,
        query: InstructionQuery,
    ) -> impl Future<Output = Result<Vec<CcmInstruction>, CoreError>> + Send;

    /// Every record ever created for `scope`, newest first.
    fn history(
        &self,
        scope: ScopeRef,
    ) -> impl Future<Output = Result<Vec<CcmInstruction>, CoreError>> + Send;

    /// All scopes that currently have a record.
    fn current_scopes(&self) -> impl Future<Output = Result<Vec<ScopeRef>, CoreError>> + Send;

    /// Insert a current record (and its initial sections) as one atomic step.
    ///
    /// Fails with [`CoreError::Conflict`] if the scope already has a current record.
    fn insert(
        &self,
        input: NewCcmInstruction,
    ) -> impl Future<Output = Result<CcmInstructionWithSections, CoreError>> + Send;

    /// Apply the `Some` fields of `patch`. Returns `None` if no current record matches.
    fn update(
        &self,
        id: DbId,
        patch: &CcmFields,
    ) -> impl Future<Output = Result<Option<CcmInstruction>, CoreError>> + Send;

    /// Flip `is_current` off. Returns `false` if the record was not current.
    fn soft_delete(&self, id: DbId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Returns `None` if the parent instruction is missing or not current.
    fn insert_sealing(
        &self,
        instruction_id: DbId,
        input: &CreateSealingSection,
    ) -> impl Future<Output = Result<Option<SealingSection>, CoreError>> + Send;

    /// Sections of a non-current instruction are frozen: updates return
    /// `None` and deletes return `false`, as for a missing section.
    fn update_sealing(
        &self,
        id: DbId,
        input: &UpdateSealingSection,
    ) -> impl Future<Output = Result<Option<SealingSection>, CoreError>> + Send;

    fn delete_sealing(&self, id: DbId) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Returns `None` if the parent instruction is missing or not current.
    fn insert_lining(
        &self,
        instruction_id: DbId,
        input: &CreateLiningSection,
    ) -> impl Future<Output = Result<Option<LiningSection>, CoreError>> + Send;

    /// Frozen under a non-current instruction, like [`Self::update_sealing`].
    fn update_lining(
        &self,
        id: DbId,
        input: &UpdateLiningSection,
    ) -> impl Future<Output = Result<Option<LiningSection>, CoreError>> + Send;

    fn delete_lining(&self, id: DbId) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

/// Validate a commodity name and return it trimmed.
pub fn normalize_commodity(commodity: &str) -> Result<String, CoreError> {
    let trimmed = commodity.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Commodity must not be empty".to_string(),
        ));
    }
    let chars = trimmed.chars().count();
    if chars > MAX_COMMODITY_LEN {
        return Err(CoreError::Validation(format!(
            "Commodity too long: {chars} chars (max {MAX_COMMODITY_LEN})"
        )));
    }
    Ok(trimmed.to_string())
}

/// Current instruction at `scope`, with sections.
pub async fn get_by_scope<S: CcmStore>(
    store: &S,
    scope: ScopeRef,
) -> Result<Option<CcmInstructionWithSections>, CoreError> {
    store.find_current(scope).await
}

/// Current instruction by id, with sections.
pub async fn get<S: CcmStore>(
    store: &S,
    id: DbId,
) -> Result<CcmInstructionWithSections, CoreError> {
    store
        .find_by_id(id)
        .await?
        .ok_or(CoreError::InstructionNotFound { id })
}

pub async fn list<S: CcmStore>(
    store: &S,
    filter: &CcmInstructionFilter,
) -> Result<Vec<CcmInstruction>, CoreError> {
    let scope_type = filter
        .scope_type
        .as_deref()
        .map(ScopeLevel::parse)
        .transpose()?;
    store
        .list(InstructionQuery {
            scope_type,
            scope_id: filter.scope_id,
            include_inactive: filter.include_inactive,
        })
        .await
}

pub async fn history<S: CcmStore>(
    store: &S,
    scope: ScopeRef,
) -> Result<Vec<CcmInstruction>, CoreError> {
    store.history(scope).await
}

/// Create the instruction for a previously bare scope.
///
/// The scope's display name is resolved from the hierarchy first; an unknown
/// scope fails with [`CoreError::ScopeNotFound`] and nothing is written.
/// The name lookup and the conflict check are reads ahead of the insert, not
/// part of its transaction; only the record and its sections commit together.
pub async fn create<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    input: CreateCcmInstruction,
    actor_id: DbId,
) -> Result<CcmInstructionWithSections, CoreError> {
    let scope = ScopeRef::parse(&input.scope_type, input.scope_id)?;

    let mut sealing = input.sealing;
    for section in &mut sealing {
        section.commodity = normalize_commodity(&section.commodity)?;
    }
    let mut lining = input.lining;
    for section in &mut lining {
        section.commodity = normalize_commodity(&section.commodity)?;
    }

    let info = hierarchy
        .scope_info(scope)
        .await?
        .ok_or(CoreError::ScopeNotFound {
            level: scope.level,
            id: scope.id,
        })?;

    if store.find_current(scope).await?.is_some() {
        return Err(CoreError::Conflict(format!(
            "Scope {scope} already has a current CCM instruction"
        )));
    }

    let created = store
        .insert(NewCcmInstruction {
            scope,
            scope_name: info.name,
            fields: input.fields,
            created_by: actor_id,
            sealing,
            lining,
        })
        .await?;

    tracing::info!(
        id = created.instruction.id,
        scope = %scope,
        version = created.instruction.version,
        actor_id,
        "CCM instruction created"
    );
    Ok(created)
}

/// Apply a partial update. Absent fields keep their stored values.
pub async fn update<S: CcmStore>(
    store: &S,
    id: DbId,
    patch: &CcmFields,
) -> Result<CcmInstruction, CoreError> {
    let updated = store
        .update(id, patch)
        .await?
        .ok_or(CoreError::InstructionNotFound { id })?;
    tracing::info!(id, fields = patch.declared().len(), "CCM instruction updated");
    Ok(updated)
}

/// Retire an instruction. Returns `false` if it was already inactive.
pub async fn soft_delete<S: CcmStore>(store: &S, id: DbId) -> Result<bool, CoreError> {
    if store.soft_delete(id).await? {
        tracing::info!(id, "CCM instruction soft-deleted");
        return Ok(true);
    }
    match store.find_by_id_include_inactive(id).await? {
        Some(_) => Ok(false),
        None => Err(CoreError::InstructionNotFound { id }),
    }
}

pub async fn add_sealing<S: CcmStore>(
    store: &S,
    instruction_id: DbId,
    input: &CreateSealingSection,
) -> Result<SealingSection, CoreError> {
    let input = CreateSealingSection {
        commodity: normalize_commodity(&input.commodity)?,
        ..input.clone()
    };
    let section = store
        .insert_sealing(instruction_id, &input)
        .await?
        .ok_or(CoreError::InstructionNotFound { id: instruction_id })?;
    tracing::info!(
        id = section.id,
        instruction_id,
        commodity = %section.commodity,
        "Sealing section added"
    );
    Ok(section)
}

pub async fn update_sealing<S: CcmStore>(
    store: &S,
    id: DbId,
    input: &UpdateSealingSection,
) -> Result<SealingSection, CoreError> {
    let input = UpdateSealingSection {
        commodity: input.commodity.as_deref().map(normalize_commodity).transpose()?,
        ..input.clone()
    };
    store
        .update_sealing(id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "sealing_section",
            id,
        })
}

pub async fn remove_sealing<S: CcmStore>(store: &S, id: DbId) -> Result<(), CoreError> {
    if !store.delete_sealing(id).await? {
        return Err(CoreError::NotFound {
            entity: "sealing_section",
            id,
        });
    }
    tracing::info!(id, "Sealing section removed");
    Ok(())
}

pub async fn add_lining<S: CcmStore>(
    store: &S,
    instruction_id: DbId,
    input: &CreateLiningSection,
) -> Result<LiningSection, CoreError> {
    let input = CreateLiningSection {
        commodity: normalize_commodity(&input.commodity)?,
        ..input.clone()
    };
    let section = store
        .insert_lining(instruction_id, &input)
        .await?
        .ok_or(CoreError::InstructionNotFound { id: instruction_id })?;
    tracing::info!(
        id = section.id,
        instruction_id,
        commodity = %section.commodity,
        "Lining section added"
    );
    Ok(section)
}

pub async fn update_lining<S: CcmStore>(
    store: &S,
    id: DbId,
    input: &UpdateLiningSection,
) -> Result<LiningSection, CoreError> {
    let input = UpdateLiningSection {
        commodity: input.commodity.as_deref().map(normalize_commodity).transpose()?,
        ..input.clone()
    };
    store
        .update_lining(id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lining_section",
            id,
        })
}

pub async fn remove_lining<S: CcmStore>(store: &S, id: DbId) -> Result<(), CoreError> {
    if !store.delete_lining(id).await? {
        return Err(CoreError::NotFound {
            entity: "lining_section",
            id,
        });
    }
    tracing::info!(id, "Lining section removed");
    Ok(())
}
