/// Token issuance and validation
///
/// Tokens are JWTs signed with a symmetric secret. The secret, the HMAC
/// algorithm and both lifetimes are fixed when the `TokenService` is built
/// at startup; the service keeps no session state, so decoding a token is the
/// only way to recover the identity it carries.
///
/// # Payload
///
/// ```json
/// { "sub": "alice", "id": 42, "scope": "access_token", "exp": 1735689600 }
/// ```
///
/// # Token Scopes
///
/// - **`access_token`**: short-lived (30 minutes by default), authorizes API calls
/// - **`refresh_token`**: long-lived (7 days by default), issued alongside the
///   access token at login
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{TokenScope, TokenService};
/// use jsonwebtoken::Algorithm;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("a-secret-of-at-least-32-bytes-long!", Algorithm::HS256)?;
///
/// let pair = tokens.issue_pair("alice", 42)?;
/// let claims = tokens.validate(&pair.access_token, TokenScope::AccessToken)?;
/// assert_eq!(claims.sub, "alice");
/// assert_eq!(claims.id, 42);
///
/// // A refresh token is not accepted where an access token is required
/// assert!(tokens.validate(&pair.refresh_token, TokenScope::AccessToken).is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default access token lifetime
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Service was configured with an unusable algorithm
    #[error("Invalid token configuration: {0}")]
    Config(String),

    /// Bad signature, malformed payload or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but carries the wrong scope
    #[error("Invalid scope for token: expected {expected}, got {actual}")]
    InvalidScope { expected: String, actual: String },
}

/// Token scope label
///
/// Distinguishes access from refresh tokens. This is not a permission system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    AccessToken,
    RefreshToken,
}

impl TokenScope {
    /// Wire representation of the scope
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::AccessToken => "access_token",
            TokenScope::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username at issuance time
    pub sub: String,

    /// User ID
    pub id: i64,

    /// Access or refresh
    pub scope: TokenScope,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration produces claims that are already expired.
    pub fn new(username: impl Into<String>, id: i64, scope: TokenScope, expires_in: Duration) -> Self {
        Self {
            sub: username.into(),
            id,
            scope,
            exp: (Utc::now() + expires_in).timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Access/refresh token pair returned at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens with process-wide settings
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl TokenService {
    /// Creates a token service with default lifetimes
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` if `algorithm` is not an HMAC algorithm,
    /// since only a symmetric secret is available.
    pub fn new(secret: impl Into<String>, algorithm: Algorithm) -> Result<Self, TokenError> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::Config(format!(
                "{:?} requires an asymmetric key; use HS256, HS384 or HS512",
                algorithm
            )));
        }

        Ok(Self {
            secret: secret.into(),
            algorithm,
            access_ttl: Duration::minutes(DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        })
    }

    /// Overrides token lifetimes
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Signing algorithm in use
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lifetime for tokens of the given scope
    pub fn ttl(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::AccessToken => self.access_ttl,
            TokenScope::RefreshToken => self.refresh_ttl,
        }
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, claims, &key)
            .map_err(|e| TokenError::Create(format!("Token encoding failed: {}", e)))
    }

    /// Issues a token of the given scope for an identity pair
    pub fn issue(&self, username: &str, id: i64, scope: TokenScope) -> Result<String, TokenError> {
        self.encode(&Claims::new(username, id, scope, self.ttl(scope)))
    }

    /// Issues the access and refresh tokens handed out at login
    pub fn issue_pair(&self, username: &str, id: i64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(username, id, TokenScope::AccessToken)?,
            refresh_token: self.issue(username, id, TokenScope::RefreshToken)?,
        })
    }

    /// Verifies signature and expiry and returns the claims, whatever their scope
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                TokenError::InvalidToken("token has expired".to_string())
            }
            _ => TokenError::InvalidToken(e.to_string()),
        })?;

        Ok(token_data.claims)
    }

    /// Decodes a token and requires a specific scope
    pub fn validate(&self, token: &str, expected: TokenScope) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;

        if claims.scope != expected {
            return Err(TokenError::InvalidScope {
                expected: expected.as_str().to_string(),
                actual: claims.scope.as_str().to_string(),
            });
        }

        Ok(claims)
    }
}
