//! Scope tree: the customer -> lease -> rider -> amendment hierarchy
//! annotated with which scopes carry a current CCM instruction.
//!
//! The tree mirrors the hierarchy exactly. Inactive scopes are surfaced via
//! `is_active`, not filtered. Rows whose parent is missing are dropped
//! rather than reported as errors.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::ccm::store::CcmStore;
use crate::error::CoreError;
use crate::hierarchy::{HierarchyEntry, LeaseHierarchy};
use crate::scope::{ScopeLevel, ScopeRef};
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    pub id: DbId,
    pub level: ScopeLevel,
    pub name: String,
    pub code: Option<String>,
    pub has_override: bool,
    pub is_active: bool,
    pub children: Vec<HierarchyNode>,
}

fn build_node(
    entry: &HierarchyEntry,
    children_of: &HashMap<ScopeRef, Vec<&HierarchyEntry>>,
    overrides: &HashSet<ScopeRef>,
) -> HierarchyNode {
    let children = children_of
        .get(&entry.scope)
        .map(|kids| {
            kids.iter()
                .map(|kid| build_node(kid, children_of, overrides))
                .collect()
        })
        .unwrap_or_default();

    HierarchyNode {
        id: entry.scope.id,
        level: entry.scope.level,
        name: entry.name.clone(),
        code: entry.code.clone(),
        has_override: overrides.contains(&entry.scope),
        is_active: entry.is_active,
        children,
    }
}

/// Assemble nested nodes from flat hierarchy rows.
///
/// Sibling order follows the order of `entries`. A row is attached only to
/// a strictly more general parent, which keeps malformed data from cycling.
pub fn assemble_tree(
    entries: &[HierarchyEntry],
    overrides: &HashSet<ScopeRef>,
) -> Vec<HierarchyNode> {
    let mut children_of: HashMap<ScopeRef, Vec<&HierarchyEntry>> = HashMap::new();
    for entry in entries {
        if let Some(parent) = entry.parent {
            if parent.level < entry.scope.level {
                children_of.entry(parent).or_default().push(entry);
            }
        }
    }

    entries
        .iter()
        .filter(|e| e.scope.level == ScopeLevel::Customer)
        .map(|e| build_node(e, &children_of, overrides))
        .collect()
}

/// Build the annotated scope tree, optionally for a single customer.
pub async fn build_tree<S: CcmStore, H: LeaseHierarchy>(
    store: &S,
    hierarchy: &H,
    customer_id: Option<DbId>,
) -> Result<Vec<HierarchyNode>, CoreError> {
    let entries = hierarchy.list_entries(customer_id).await?;
    let overrides: HashSet<ScopeRef> = store.current_scopes().await?.into_iter().collect();
    let tree = assemble_tree(&entries, &overrides);
    tracing::debug!(
        customers = tree.len(),
        nodes = entries.len(),
        overrides = overrides.len(),
        "Built CCM scope tree"
    );
    Ok(tree)
}
