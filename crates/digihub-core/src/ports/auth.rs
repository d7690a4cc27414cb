//! Bearer-token identity port.
//!
//! Tokens are issued by the identity provider; this service only needs to
//! validate them and read the subject.

use uuid::Uuid;

/// Role allowed to manage categories and tags.
pub const EDITOR_ROLE: &str = "editor";

/// What a validated bearer token says about its holder.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// Subject; doubles as the local user id.
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

pub trait TokenService: Send + Sync {
    /// Sign a token. Used by tooling and tests; the server only validates.
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Check signature, issuer and expiry, then decode.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}
