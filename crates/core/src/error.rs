use crate::scope::ScopeLevel;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Scope not found: {level} with id {id}")]
    ScopeNotFound { level: ScopeLevel, id: DbId },

    #[error("CCM instruction not found: id {id}")]
    InstructionNotFound { id: DbId },

    #[error("Car {car_number} has no active lease placement")]
    CarNotPlaced { car_number: String },

    #[error("Hierarchy path has no customer")]
    UnplacedPath,

    #[error("Invalid scope type '{0}'. Must be one of: customer, master_lease, rider, amendment")]
    InvalidScopeType(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}
