use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - an author or reader known from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user record for a token subject.
    ///
    /// The username defaults to the local part of the email address.
    pub fn new(id: Uuid, email: String) -> Self {
        let now = Utc::now();
        let username = email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or("user")
            .to_string();

        Self {
            id,
            username,
            email,
            created_at: now,
            updated_at: now,
        }
    }
}
