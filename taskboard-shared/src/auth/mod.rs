/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Access/refresh token issuance and validation
/// - [`authenticator`]: Username/password verification against the store
/// - [`guard`]: Bearer header → [`guard::Principal`] resolution
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{TokenScope, TokenService};
/// use jsonwebtoken::Algorithm;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::new("a-secret-of-at-least-32-bytes-long!", Algorithm::HS256)?;
/// let token = tokens.issue("alice", 1, TokenScope::AccessToken)?;
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod guard;
pub mod jwt;
pub mod password;
