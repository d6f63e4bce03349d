//! Merge engine: effective CCM configuration for a hierarchy path.
//!
//! Levels are walked customer -> master lease -> rider -> amendment. Each
//! non-null scalar field overwrites the running value and records the level
//! as its source, so the most specific declaration wins. Commodity sections
//! merge the same way, keyed by commodity name, except that entries flagged
//! `inherit_from_parent` are skipped and leave any ancestor entry in place.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ccm::store::CcmStore;
use crate::ccm::types::{
    CcmInstructionWithSections, CommoditySection, FieldValue, LiningSection, SealingSection,
};
use crate::error::CoreError;
use crate::hierarchy::{path_for_scope, HierarchyPath, LeaseHierarchy};
use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::DbId;

/// One level's input to the merge.
#[derive(Debug, Clone)]
pub struct LevelSnapshot {
    pub scope: ScopeRef,
    pub scope_name: Option<String>,
    pub instruction: Option<CcmInstructionWithSections>,
}

/// One entry of the inheritance chain summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainEntry {
    pub level: ScopeLevel,
    pub scope_id: DbId,
    pub scope_name: Option<String>,
    pub instruction_id: Option<DbId>,
    /// Scalar fields this level declared, in field-table order.
    pub fields: Vec<String>,
}

/// A winning commodity section and the level that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveSection<T> {
    pub source: ScopeLevel,
    pub source_scope_id: DbId,
    #[serde(flatten)]
    pub section: T,
}

/// Fully merged configuration. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveCcm {
    pub path: HierarchyPath,
    /// Only fields declared at some level are present.
    pub fields: BTreeMap<String, FieldValue>,
    pub sources: BTreeMap<String, ScopeLevel>,
    pub chain: Vec<ChainEntry>,
    pub sealing: BTreeMap<String, EffectiveSection<SealingSection>>,
    pub lining: BTreeMap<String, EffectiveSection<LiningSection>>,
}

fn merge_sections<T: CommoditySection + Clone>(
    target: &mut BTreeMap<String, EffectiveSection<T>>,
    scope: ScopeRef,
    sections: &[T],
) {
    let mut ordered: Vec<&T> = sections.iter().collect();
    ordered.sort_by_key(|s| s.sort_key());
    for section in ordered {
        if section.inherit_from_parent() {
            continue;
        }
        target.insert(
            section.commodity().to_string(),
            EffectiveSection {
                source: scope.level,
                source_scope_id: scope.id,
                section: section.clone(),
            },
        );
    }
}

/// Merge level snapshots into an effective configuration.
///
/// Pure and deterministic. Snapshots are walked general to specific
/// regardless of the order they are supplied in.
pub fn merge_levels(path: HierarchyPath, mut levels: Vec<LevelSnapshot>) -> EffectiveCcm {
    levels.sort_by_key(|l| l.scope.level);

    let mut effective = EffectiveCcm {
        path,
        fields: BTreeMap::new(),
        sources: BTreeMap::new(),
        chain: Vec::with_capacity(levels.len()),
        sealing: BTreeMap::new(),
        lining: BTreeMap::new(),
    };

    for level in levels {
        let mut declared_names = Vec::new();
        if let Some(found) = &level.instruction {
            for (name, value) in found.instruction.fields.declared() {
                effective.fields.insert(name.to_string(), value);
                effective.sources.insert(name.to_string(), level.scope.level);
                declared_names.push(name.to_string());
            }
            merge_sections(&mut effective.sealing, level.scope, &found.sealing);
            merge_sections(&mut effective.lining, level.scope, &found.lining);
        }

        effective.chain.push(ChainEntry {
            level: level.scope.level,
            scope_id: level.scope.id,
            scope_name: level.scope_name,
            instruction_id: level.instruction.as_ref().map(|i| i.instruction.id),
            fields: declared_names,
        });
    }

    effective
}

/// Resolve the effective configuration for a hierarchy path.
///
/// Each level is read independently; there is no cross-level snapshot
/// isolation. A path without a customer fails with [`CoreError::UnplacedPath`].
pub async fn resolve<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    path: HierarchyPath,
) -> Result<EffectiveCcm, CoreError> {
    if path.customer_id.is_none() {
        return Err(CoreError::UnplacedPath);
    }

    let scopes = path.scopes();
    let mut levels = Vec::with_capacity(scopes.len());
    for scope in scopes {
        let instruction = store.find_current(scope).await?;
        let scope_name = match &instruction {
            Some(found) => Some(found.instruction.scope_name.clone()),
            None => hierarchy.scope_info(scope).await?.map(|info| info.name),
        };
        levels.push(LevelSnapshot {
            scope,
            scope_name,
            instruction,
        });
    }

    let effective = merge_levels(path, levels);
    tracing::debug!(
        levels = effective.chain.len(),
        fields = effective.fields.len(),
        sealing = effective.sealing.len(),
        lining = effective.lining.len(),
        "Resolved effective CCM configuration"
    );
    Ok(effective)
}

/// Resolve at an arbitrary hierarchy point.
pub async fn resolve_for_scope<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    scope: ScopeRef,
) -> Result<EffectiveCcm, CoreError> {
    let path = path_for_scope(hierarchy, scope).await?;
    resolve(store, hierarchy, path).await
}

/// Resolve for a car's placement as of `as_of`.
pub async fn resolve_for_car<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    car_number: &str,
    as_of: NaiveDate,
) -> Result<EffectiveCcm, CoreError> {
    let not_placed = || CoreError::CarNotPlaced {
        car_number: car_number.to_string(),
    };
    let path = hierarchy
        .car_placement(car_number, as_of)
        .await?
        .ok_or_else(not_placed)?;
    if path.customer_id.is_none() {
        return Err(not_placed());
    }
    resolve(store, hierarchy, path).await
}
