//! Scope levels at which CCM instructions can be declared.
//!
//! Levels are totally ordered from most general (`customer`) to most
//! specific (`amendment`); the derived `Ord` follows declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const SCOPE_CUSTOMER: &str = "customer";
pub const SCOPE_MASTER_LEASE: &str = "master_lease";
pub const SCOPE_RIDER: &str = "rider";
pub const SCOPE_AMENDMENT: &str = "amendment";

/// All valid scope type values, general to specific.
pub const VALID_SCOPE_TYPES: &[&str] = &[
    SCOPE_CUSTOMER,
    SCOPE_MASTER_LEASE,
    SCOPE_RIDER,
    SCOPE_AMENDMENT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    Customer,
    MasterLease,
    Rider,
    Amendment,
}

impl ScopeLevel {
    /// Walk order used by the merge engine.
    pub const ALL: [ScopeLevel; 4] = [
        ScopeLevel::Customer,
        ScopeLevel::MasterLease,
        ScopeLevel::Rider,
        ScopeLevel::Amendment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => SCOPE_CUSTOMER,
            Self::MasterLease => SCOPE_MASTER_LEASE,
            Self::Rider => SCOPE_RIDER,
            Self::Amendment => SCOPE_AMENDMENT,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            SCOPE_CUSTOMER => Ok(Self::Customer),
            SCOPE_MASTER_LEASE => Ok(Self::MasterLease),
            SCOPE_RIDER => Ok(Self::Rider),
            SCOPE_AMENDMENT => Ok(Self::Amendment),
            _ => Err(CoreError::InvalidScopeType(s.to_string())),
        }
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete point in the lease hierarchy: a level plus the id of the row
/// in that level's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeRef {
    pub level: ScopeLevel,
    pub id: DbId,
}

impl ScopeRef {
    pub fn new(level: ScopeLevel, id: DbId) -> Self {
        Self { level, id }
    }

    pub fn customer(id: DbId) -> Self {
        Self::new(ScopeLevel::Customer, id)
    }

    pub fn master_lease(id: DbId) -> Self {
        Self::new(ScopeLevel::MasterLease, id)
    }

    pub fn rider(id: DbId) -> Self {
        Self::new(ScopeLevel::Rider, id)
    }

    pub fn amendment(id: DbId) -> Self {
        Self::new(ScopeLevel::Amendment, id)
    }

    /// Parse a raw `(scope_type, scope_id)` pair as received from a caller.
    pub fn parse(scope_type: &str, id: DbId) -> Result<Self, CoreError> {
        Ok(Self::new(ScopeLevel::parse(scope_type)?, id))
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level, self.id)
    }
}
