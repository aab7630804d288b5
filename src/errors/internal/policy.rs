use thiserror::Error;

use crate::types::internal::account::Role;

/// Visibility and assignment policy violations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    /// The caller's own account is missing from the candidate set
    #[error("Actor not found: {actor_id}")]
    ActorNotFound { actor_id: i32 },

    /// Caller role has no directory permissions at all
    #[error("Role {role} has no directory permissions")]
    NotStaff { role: Role },

    #[error("Role {caller} may not assign role {requested}")]
    RoleNotAssignable { caller: Role, requested: Role },

    /// The resulting record would fall outside the caller's religion/cast scope
    #[error("Account is outside the caller's religion/cast scope")]
    OutOfScope,

    /// Target exists but is not in the caller's visible set
    #[error("Account {target_id} is not visible to account {actor_id}")]
    NotVisible { actor_id: i32, target_id: i32 },
}
