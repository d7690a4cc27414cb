use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, UserRepository};

/// Return the user for a token subject, creating the record on first use.
pub async fn ensure_user(
    users: &dyn UserRepository,
    id: Uuid,
    email: &str,
) -> Result<User, DomainError> {
    if let Some(user) = users.find_by_id(id).await? {
        return Ok(user);
    }

    tracing::info!(user_id = %id, "Provisioning user from token subject");
    match users.insert(User::new(id, email.to_string())).await {
        Ok(user) => Ok(user),
        // A concurrent request provisioned the same subject first.
        Err(RepoError::Constraint(detail)) => {
            tracing::debug!(user_id = %id, detail = %detail, "User provisioned concurrently");
            users
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found("user", id))
        }
        Err(e) => Err(e.into()),
    }
}
