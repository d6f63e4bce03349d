//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use crate::ccm::store::CcmStore;
use crate::ccm::types::{
    CcmFields, CcmInstruction, CcmInstructionWithSections, CreateLiningSection,
    CreateSealingSection, InstructionQuery, LiningSection, NewCcmInstruction, SealingSection,
    UpdateLiningSection, UpdateSealingSection,
};
use crate::error::CoreError;
use crate::hierarchy::{HierarchyEntry, HierarchyPath, LeaseHierarchy, ScopeInfo};
use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::DbId;

#[derive(Default)]
struct StoreState {
    next_id: DbId,
    instructions: BTreeMap<DbId, CcmInstruction>,
    sealing: BTreeMap<DbId, SealingSection>,
    lining: BTreeMap<DbId, LiningSection>,
}

impl StoreState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn is_current(&self, instruction_id: DbId) -> bool {
        self.instructions
            .get(&instruction_id)
            .is_some_and(|i| i.is_current)
    }

    fn with_sections(&self, instruction: &CcmInstruction) -> CcmInstructionWithSections {
        let mut sealing: Vec<_> = self
            .sealing
            .values()
            .filter(|s| s.ccm_instruction_id == instruction.id)
            .cloned()
            .collect();
        sealing.sort_by_key(|s| (s.sort_order, s.id));
        let mut lining: Vec<_> = self
            .lining
            .values()
            .filter(|s| s.ccm_instruction_id == instruction.id)
            .cloned()
            .collect();
        lining.sort_by_key(|s| (s.sort_order, s.id));
        CcmInstructionWithSections {
            instruction: instruction.clone(),
            sealing,
            lining,
        }
    }

    fn new_sealing(
        &mut self,
        instruction_id: DbId,
        input: &CreateSealingSection,
    ) -> SealingSection {
        let now = Utc::now();
        let section = SealingSection {
            id: self.next_id(),
            ccm_instruction_id: instruction_id,
            commodity: input.commodity.clone(),
            gasket_material: input.gasket_material.clone(),
            o_ring_material: input.o_ring_material.clone(),
            sealing_notes: input.sealing_notes.clone(),
            sort_order: input.sort_order.unwrap_or(0),
            inherit_from_parent: input.inherit_from_parent.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        self.sealing.insert(section.id, section.clone());
        section
    }

    fn new_lining(&mut self, instruction_id: DbId, input: &CreateLiningSection) -> LiningSection {
        let now = Utc::now();
        let section = LiningSection {
            id: self.next_id(),
            ccm_instruction_id: instruction_id,
            commodity: input.commodity.clone(),
            lining_required: input.lining_required,
            lining_type: input.lining_type.clone(),
            lining_notes: input.lining_notes.clone(),
            sort_order: input.sort_order.unwrap_or(0),
            inherit_from_parent: input.inherit_from_parent.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        self.lining.insert(section.id, section.clone());
        section
    }
}

/// [`CcmStore`] backed by maps behind a mutex.
#[derive(Default)]
pub struct InMemoryCcmStore {
    state: Mutex<StoreState>,
}

impl InMemoryCcmStore {
    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// An instruction with its sections regardless of `is_current`.
    pub fn snapshot(&self, id: DbId) -> CcmInstructionWithSections {
        let state = self.state();
        state.with_sections(&state.instructions[&id])
    }
}

impl CcmStore for InMemoryCcmStore {
    async fn find_current(
        &self,
        scope: ScopeRef,
    ) -> Result<Option<CcmInstructionWithSections>, CoreError> {
        let state = self.state();
        Ok(state
            .instructions
            .values()
            .find(|i| i.is_current && i.scope() == scope)
            .map(|i| state.with_sections(i)))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<CcmInstructionWithSections>, CoreError> {
        let state = self.state();
        Ok(state
            .instructions
            .get(&id)
            .filter(|i| i.is_current)
            .map(|i| state.with_sections(i)))
    }

    async fn find_by_id_include_inactive(
        &self,
        id: DbId,
    ) -> Result<Option<CcmInstruction>, CoreError> {
        Ok(self.state().instructions.get(&id).cloned())
    }

    async fn list(&self, query: InstructionQuery) -> Result<Vec<CcmInstruction>, CoreError> {
        Ok(self
            .state()
            .instructions
            .values()
            .filter(|i| query.include_inactive || i.is_current)
            .filter(|i| query.scope_type.map_or(true, |t| t == i.scope_type))
            .filter(|i| query.scope_id.map_or(true, |id| id == i.scope_id))
            .cloned()
            .collect())
    }

    async fn history(&self, scope: ScopeRef) -> Result<Vec<CcmInstruction>, CoreError> {
        let mut rows: Vec<_> = self
            .state()
            .instructions
            .values()
            .filter(|i| i.scope() == scope)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.version.cmp(&a.version).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn current_scopes(&self) -> Result<Vec<ScopeRef>, CoreError> {
        Ok(self
            .state()
            .instructions
            .values()
            .filter(|i| i.is_current)
            .map(CcmInstruction::scope)
            .collect())
    }

    async fn insert(
        &self,
        input: NewCcmInstruction,
    ) -> Result<CcmInstructionWithSections, CoreError> {
        let mut state = self.state();
        let previous = state
            .instructions
            .values()
            .filter(|i| i.scope() == input.scope);
        let mut version = 0;
        for row in previous {
            if row.is_current {
                return Err(CoreError::Conflict(format!(
                    "Duplicate current instruction for {}",
                    input.scope
                )));
            }
            version = version.max(row.version);
        }

        let now = Utc::now();
        let instruction = CcmInstruction {
            id: state.next_id(),
            scope_type: input.scope.level,
            scope_id: input.scope.id,
            scope_name: input.scope_name,
            fields: input.fields,
            version: version + 1,
            is_current: true,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };
        state.instructions.insert(instruction.id, instruction.clone());
        for section in &input.sealing {
            state.new_sealing(instruction.id, section);
        }
        for section in &input.lining {
            state.new_lining(instruction.id, section);
        }
        Ok(state.with_sections(&instruction))
    }

    async fn update(
        &self,
        id: DbId,
        patch: &CcmFields,
    ) -> Result<Option<CcmInstruction>, CoreError> {
        let mut state = self.state();
        Ok(state
            .instructions
            .get_mut(&id)
            .filter(|i| i.is_current)
            .map(|i| {
                i.fields.apply(patch);
                i.updated_at = Utc::now();
                i.clone()
            }))
    }

    async fn soft_delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut state = self.state();
        match state.instructions.get_mut(&id) {
            Some(i) if i.is_current => {
                i.is_current = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_sealing(
        &self,
        instruction_id: DbId,
        input: &CreateSealingSection,
    ) -> Result<Option<SealingSection>, CoreError> {
        let mut state = self.state();
        if !state.is_current(instruction_id) {
            return Ok(None);
        }
        Ok(Some(state.new_sealing(instruction_id, input)))
    }

    async fn update_sealing(
        &self,
        id: DbId,
        input: &UpdateSealingSection,
    ) -> Result<Option<SealingSection>, CoreError> {
        let mut state = self.state();
        let parent = state.sealing.get(&id).map(|s| s.ccm_instruction_id);
        if !parent.is_some_and(|p| state.is_current(p)) {
            return Ok(None);
        }
        Ok(state.sealing.get_mut(&id).map(|s| {
            if let Some(v) = &input.commodity {
                s.commodity = v.clone();
            }
            if input.gasket_material.is_some() {
                s.gasket_material = input.gasket_material.clone();
            }
            if input.o_ring_material.is_some() {
                s.o_ring_material = input.o_ring_material.clone();
            }
            if input.sealing_notes.is_some() {
                s.sealing_notes = input.sealing_notes.clone();
            }
            if let Some(v) = input.sort_order {
                s.sort_order = v;
            }
            if let Some(v) = input.inherit_from_parent {
                s.inherit_from_parent = v;
            }
            s.clone()
        }))
    }

    async fn delete_sealing(&self, id: DbId) -> Result<bool, CoreError> {
        let mut state = self.state();
        let parent = state.sealing.get(&id).map(|s| s.ccm_instruction_id);
        if !parent.is_some_and(|p| state.is_current(p)) {
            return Ok(false);
        }
        Ok(state.sealing.remove(&id).is_some())
    }

    async fn insert_lining(
        &self,
        instruction_id: DbId,
        input: &CreateLiningSection,
    ) -> Result<Option<LiningSection>, CoreError> {
        let mut state = self.state();
        if !state.is_current(instruction_id) {
            return Ok(None);
        }
        Ok(Some(state.new_lining(instruction_id, input)))
    }

    async fn update_lining(
        &self,
        id: DbId,
        input: &UpdateLiningSection,
    ) -> Result<Option<LiningSection>, CoreError> {
        let mut state = self.state();
        let parent = state.lining.get(&id).map(|s| s.ccm_instruction_id);
        if !parent.is_some_and(|p| state.is_current(p)) {
            return Ok(None);
        }
        Ok(state.lining.get_mut(&id).map(|s| {
            if let Some(v) = &input.commodity {
                s.commodity = v.clone();
            }
            if input.lining_required.is_some() {
                s.lining_required = input.lining_required;
            }
            if input.lining_type.is_some() {
                s.lining_type = input.lining_type.clone();
            }
            if input.lining_notes.is_some() {
                s.lining_notes = input.lining_notes.clone();
            }
            if let Some(v) = input.sort_order {
                s.sort_order = v;
            }
            if let Some(v) = input.inherit_from_parent {
                s.inherit_from_parent = v;
            }
            s.clone()
        }))
    }

    async fn delete_lining(&self, id: DbId) -> Result<bool, CoreError> {
        let mut state = self.state();
        let parent = state.lining.get(&id).map(|s| s.ccm_instruction_id);
        if !parent.is_some_and(|p| state.is_current(p)) {
            return Ok(false);
        }
        Ok(state.lining.remove(&id).is_some())
    }
}

/// [`LeaseHierarchy`] over an in-memory entry table.
#[derive(Default)]
pub struct FakeHierarchy {
    entries: BTreeMap<ScopeRef, HierarchyEntry>,
    placements: HashMap<String, HierarchyPath>,
}

impl FakeHierarchy {
    fn add(&mut self, scope: ScopeRef, parent: Option<ScopeRef>, name: &str) {
        self.entries.insert(
            scope,
            HierarchyEntry {
                scope,
                parent,
                name: name.to_string(),
                code: None,
                is_active: true,
            },
        );
    }

    pub fn add_customer(&mut self, id: DbId, name: &str) {
        self.add(ScopeRef::customer(id), None, name);
    }

    pub fn add_master_lease(&mut self, id: DbId, customer_id: DbId, name: &str) {
        self.add(ScopeRef::master_lease(id), Some(ScopeRef::customer(customer_id)), name);
    }

    pub fn add_rider(&mut self, id: DbId, master_lease_id: DbId, name: &str) {
        self.add(ScopeRef::rider(id), Some(ScopeRef::master_lease(master_lease_id)), name);
    }

    pub fn add_amendment(
        &mut self,
        id: DbId,
        master_lease_id: DbId,
        rider_id: Option<DbId>,
        name: &str,
    ) {
        let parent = match rider_id {
            Some(rider_id) => ScopeRef::rider(rider_id),
            None => ScopeRef::master_lease(master_lease_id),
        };
        self.add(ScopeRef::amendment(id), Some(parent), name);
    }

    pub fn deactivate(&mut self, scope: ScopeRef) {
        if let Some(entry) = self.entries.get_mut(&scope) {
            entry.is_active = false;
        }
    }

    pub fn remove(&mut self, scope: ScopeRef) {
        self.entries.remove(&scope);
    }

    pub fn place_car(&mut self, car_number: &str, path: HierarchyPath) {
        self.placements.insert(car_number.to_string(), path);
    }

    fn root_customer(&self, scope: ScopeRef) -> Option<DbId> {
        let mut current = self.entries.get(&scope)?;
        while let Some(parent) = current.parent {
            current = self.entries.get(&parent)?;
        }
        (current.scope.level == ScopeLevel::Customer).then_some(current.scope.id)
    }
}

impl LeaseHierarchy for FakeHierarchy {
    async fn scope_info(&self, scope: ScopeRef) -> Result<Option<ScopeInfo>, CoreError> {
        Ok(self.entries.get(&scope).map(|e| ScopeInfo {
            name: e.name.clone(),
            code: e.code.clone(),
            is_active: e.is_active,
        }))
    }

    async fn parent_of(&self, scope: ScopeRef) -> Result<Option<ScopeRef>, CoreError> {
        Ok(self.entries.get(&scope).and_then(|e| e.parent))
    }

    async fn car_placement(
        &self,
        car_number: &str,
        _as_of: NaiveDate,
    ) -> Result<Option<HierarchyPath>, CoreError> {
        Ok(self.placements.get(car_number).copied())
    }

    async fn list_entries(
        &self,
        customer_id: Option<DbId>,
    ) -> Result<Vec<HierarchyEntry>, CoreError> {
        Ok(self
            .entries
            .values()
            .filter(|e| customer_id.is_none() || self.root_customer(e.scope) == customer_id)
            .cloned()
            .collect())
    }
}

/// Two customers; the first has a full lease/rider/amendment chain plus a
/// lease-level amendment, the second a single lease and rider.
pub fn sample_hierarchy() -> FakeHierarchy {
    let mut h = FakeHierarchy::default();
    h.add_customer(1, "Acme Foods");
    h.add_master_lease(10, 1, "ML-10");
    h.add_rider(100, 10, "R-100");
    h.add_amendment(1000, 10, Some(100), "A-1000");
    h.add_amendment(2000, 10, None, "A-2000");
    h.add_customer(2, "Basin Chemical");
    h.add_master_lease(20, 2, "ML-20");
    h.add_rider(200, 20, "R-200");
    h.place_car(
        "ACFX 1001",
        HierarchyPath {
            customer_id: Some(1),
            master_lease_id: Some(10),
            rider_id: Some(100),
            amendment_id: Some(1000),
        },
    );
    h
}
