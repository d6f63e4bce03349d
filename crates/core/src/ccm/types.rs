//! CCM instruction model and DTOs.
//!
//! An instruction is the set of fields explicitly declared at one scope.
//! Every scalar field is nullable: `None` means "not declared here, inherit
//! from the ancestor". There is no separate "cleared" marker.

use serde::{Deserialize, Serialize};

use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::{DbId, Timestamp};

/// A declared scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

/// A single field's storage slot, declared or not. Used by persistence
/// layers to bind and read columns without listing every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot<'a> {
    Bool(Option<bool>),
    Text(Option<&'a str>),
}

/// Defines [`CcmFields`] together with its name tables and the per-field
/// iteration used by the merge engine, partial updates, and persistence.
macro_rules! ccm_fields {
    (
        bool: [$($b:ident),* $(,)?],
        text: [$($t:ident),* $(,)?] $(,)?
    ) => {
        /// The independently overridable scalar fields of an instruction.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct CcmFields {
            $(pub $b: Option<bool>,)*
            $(pub $t: Option<String>,)*
        }

        impl CcmFields {
            /// Field names in declaration order.
            pub const NAMES: &'static [&'static str] = &[
                $(stringify!($b),)*
                $(stringify!($t),)*
            ];

            pub const BOOL_NAMES: &'static [&'static str] = &[$(stringify!($b),)*];

            pub const TEXT_NAMES: &'static [&'static str] = &[$(stringify!($t),)*];

            /// Every field's slot, in [`Self::NAMES`] order.
            pub fn slots(&self) -> Vec<FieldSlot<'_>> {
                vec![
                    $(FieldSlot::Bool(self.$b),)*
                    $(FieldSlot::Text(self.$t.as_deref()),)*
                ]
            }

            /// Set a boolean field by name. Returns `false` for an unknown name.
            pub fn set_bool(&mut self, name: &str, value: Option<bool>) -> bool {
                $(
                    if name == stringify!($b) {
                        self.$b = value;
                        return true;
                    }
                )*
                false
            }

            /// Set a text field by name. Returns `false` for an unknown name.
            pub fn set_text(&mut self, name: &str, value: Option<String>) -> bool {
                $(
                    if name == stringify!($t) {
                        self.$t = value;
                        return true;
                    }
                )*
                false
            }

            /// Non-null fields with their values, in declaration order.
            pub fn declared(&self) -> Vec<(&'static str, FieldValue)> {
                let mut out = Vec::new();
                $(
                    if let Some(v) = self.$b {
                        out.push((stringify!($b), FieldValue::Bool(v)));
                    }
                )*
                $(
                    if let Some(v) = &self.$t {
                        out.push((stringify!($t), FieldValue::Text(v.clone())));
                    }
                )*
                out
            }

            /// Copy every field that is set in `patch`; unset fields are left alone.
            pub fn apply(&mut self, patch: &CcmFields) {
                $(
                    if patch.$b.is_some() {
                        self.$b = patch.$b;
                    }
                )*
                $(
                    if patch.$t.is_some() {
                        self.$t = patch.$t.clone();
                    }
                )*
            }
        }
    };
}

ccm_fields! {
    bool: [
        food_grade,
        kosher_wash,
        mineral_wipe,
        dedicated_service,
        nitrogen_padding,
        interior_inspection_required,
        exterior_wash,
        pressure_test_required,
        valve_inspection_required,
        hatch_gasket_replacement,
        decal_required,
        customer_approval_required,
    ],
    text: [
        cleaning_procedure,
        cleaning_agent,
        rinse_method,
        drying_method,
        nitrogen_psi,
        outlet_valve_cap,
        hatch_type,
        heel_disposal,
        placard_requirements,
        documentation_requirements,
        approval_contact,
        special_instructions,
    ],
}

/// A row from the `ccm_instructions` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcmInstruction {
    pub id: DbId,
    pub scope_type: ScopeLevel,
    pub scope_id: DbId,
    /// Display name cached from the hierarchy when the record was created.
    pub scope_name: String,
    #[serde(flatten)]
    pub fields: CcmFields,
    /// Creation generation for the scope. Updates do not bump it.
    pub version: i32,
    pub is_current: bool,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CcmInstruction {
    pub fn scope(&self) -> ScopeRef {
        ScopeRef::new(self.scope_type, self.scope_id)
    }
}

/// A row from the `ccm_sealing_sections` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SealingSection {
    pub id: DbId,
    pub ccm_instruction_id: DbId,
    pub commodity: String,
    pub gasket_material: Option<String>,
    pub o_ring_material: Option<String>,
    pub sealing_notes: Option<String>,
    pub sort_order: i32,
    /// Placeholder that declines to override this commodity at its level.
    pub inherit_from_parent: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `ccm_lining_sections` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiningSection {
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

/// Common accessors the merge engine needs from both section variants.
pub trait CommoditySection {
    fn commodity(&self) -> &str;
    fn inherit_from_parent(&self) -> bool;
    fn sort_key(&self) -> (i32, DbId);
}

impl CommoditySection for SealingSection {
    fn commodity(&self) -> &str {
        &self.commodity
    }

    fn inherit_from_parent(&self) -> bool {
        self.inherit_from_parent
    }

    fn sort_key(&self) -> (i32, DbId) {
        (self.sort_order, self.id)
    }
}

impl CommoditySection for LiningSection {
    fn commodity(&self) -> &str {
        &self.commodity
    }

    fn inherit_from_parent(&self) -> bool {
        self.inherit_from_parent
    }

    fn sort_key(&self) -> (i32, DbId) {
        (self.sort_order, self.id)
    }
}

/// An instruction together with both section collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcmInstructionWithSections {
    #[serde(flatten)]
    pub instruction: CcmInstruction,
    pub sealing: Vec<SealingSection>,
    pub lining: Vec<LiningSection>,
}

/// DTO for creating an instruction at a scope.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCcmInstruction {
    pub scope_type: String,
    pub scope_id: DbId,
    #[serde(flatten)]
    pub fields: CcmFields,
    #[serde(default)]
    pub sealing: Vec<CreateSealingSection>,
    #[serde(default)]
    pub lining: Vec<CreateLiningSection>,
}

/// DTO for patching an instruction. Only `Some` fields are applied.
pub type UpdateCcmInstruction = CcmFields;

/// DTO for adding a sealing section to an instruction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSealingSection {
    pub commodity: String,
    pub gasket_material: Option<String>,
    pub o_ring_material: Option<String>,
    pub sealing_notes: Option<String>,
    /// Defaults to 0 if omitted.
    pub sort_order: Option<i32>,
    /// Defaults to `false` if omitted.
    pub inherit_from_parent: Option<bool>,
}

/// DTO for patching a sealing section. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSealingSection {
    pub commodity: Option<String>,
    pub gasket_material: Option<String>,
    pub o_ring_material: Option<String>,
    pub sealing_notes: Option<String>,
    pub sort_order: Option<i32>,
    pub inherit_from_parent: Option<bool>,
}

/// DTO for adding a lining section to an instruction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLiningSection {
    pub commodity: String,
    pub lining_required: Option<bool>,
    pub lining_type: Option<String>,
    pub lining_notes: Option<String>,
    pub sort_order: Option<i32>,
    pub inherit_from_parent: Option<bool>,
}

/// DTO for patching a lining section. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLiningSection {
    pub commodity: Option<String>,
    pub lining_required: Option<bool>,
    pub lining_type: Option<String>,
    pub lining_notes: Option<String>,
    pub sort_order: Option<i32>,
    pub inherit_from_parent: Option<bool>,
}

/// Caller-facing list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CcmInstructionFilter {
    pub scope_type: Option<String>,
    pub scope_id: Option<DbId>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Validated list filter handed to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionQuery {
    pub scope_type: Option<ScopeLevel>,
    pub scope_id: Option<DbId>,
    pub include_inactive: bool,
}

/// Validated insert handed to the store once the scope name is resolved.
#[derive(Debug, Clone)]
pub struct NewCcmInstruction {
    pub scope: ScopeRef,
    pub scope_name: String,
    pub fields: CcmFields,
    pub created_by: DbId,
    pub sealing: Vec<CreateSealingSection>,
    pub lining: Vec<CreateLiningSection>,
}
