use crate::{
    auth::AuthenticatedUser,
    errors::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Forbid,
}

/// Only the recorded owner of a resource may mutate it.
pub fn authorize_mutation(resource_owner_id: &str, authenticated_user_id: &str) -> Decision {
    if !resource_owner_id.is_empty() && resource_owner_id == authenticated_user_id {
        Decision::Allow
    } else {
        Decision::Forbid
    }
}

pub fn require_owner(
    user: &AuthenticatedUser,
    resource_owner_id: &str,
    resource: &str,
) -> AppResult<()> {
    match authorize_mutation(resource_owner_id, &user.user_id) {
        Decision::Allow => Ok(()),
        Decision::Forbid => {
            log::warn!(
                "user {} denied mutation of {} owned by {}",
                user.user_id,
                resource,
                resource_owner_id
            );
            Err(AppError::Forbidden(format!(
                "You can only modify your own {}",
                resource
            )))
        }
    }
}
