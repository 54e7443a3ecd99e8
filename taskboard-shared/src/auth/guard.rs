/// Request authorization guard
///
/// Resolves the `Authorization: Bearer <token>` header into a [`Principal`],
/// the identity every downstream operation acts as. Only access-scope tokens
/// are accepted. All failures collapse into `BoardError::Unauthenticated`.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::guard::authorize_bearer;
/// use taskboard_shared::auth::jwt::{TokenScope, TokenService};
/// use jsonwebtoken::Algorithm;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("a-secret-of-at-least-32-bytes-long!", Algorithm::HS256)?;
/// let token = tokens.issue("alice", 42, TokenScope::AccessToken)?;
///
/// let principal = authorize_bearer(Some(&format!("Bearer {}", token)), &tokens)?;
/// assert_eq!(principal.id, 42);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

use super::jwt::{TokenScope, TokenService};
use crate::error::{BoardError, BoardResult};

/// Acting identity derived from a validated access token
///
/// `username` is for display only; ownership checks compare `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Username carried in the token's `sub` claim
    pub username: String,

    /// User ID carried in the token's `id` claim
    pub id: i64,
}

impl Principal {
    pub fn new(username: impl Into<String>, id: i64) -> Self {
        Self {
            username: username.into(),
            id,
        }
    }
}

/// Resolves an `Authorization` header value into a principal
///
/// # Errors
///
/// `BoardError::Unauthenticated` when the header is absent, is not a bearer
/// credential, or carries a token that is invalid, expired or not an access
/// token.
pub fn authorize_bearer(header: Option<&str>, tokens: &TokenService) -> BoardResult<Principal> {
    let header = header
        .ok_or_else(|| BoardError::Unauthenticated("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BoardError::Unauthenticated("Expected Bearer token".to_string()))?;

    let claims = tokens.validate(token, TokenScope::AccessToken).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        BoardError::from(e)
    })?;

    Ok(Principal::new(claims.sub, claims.id))
}
