/// Domain error taxonomy
///
/// Every manager operation returns `BoardResult<T>`. The HTTP layer maps each
/// variant to a status code in exactly one place, so handlers never decide
/// status codes themselves.
///
/// | Variant              | Meaning                                          |
/// |----------------------|--------------------------------------------------|
/// | `Unauthenticated`    | Missing, invalid, expired or wrong-scope token   |
/// | `InvalidCredentials` | Login failed (unknown user and bad password alike) |
/// | `NotFound`           | Absent, or not owned by the acting principal     |
/// | `Validation`         | Bad enumeration value, non-image upload, ...     |
/// | `Conflict`           | Username or email already taken                  |
/// | `Internal`           | Storage failure (transaction already rolled back) |

use serde::{Deserialize, Serialize};

use crate::auth::jwt::TokenError;
use crate::auth::password::PasswordError;
use crate::storage::ImageStoreError;
use crate::store::StoreError;

/// Result alias used by all managers
pub type BoardResult<T> = Result<T, BoardError>;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field that failed validation
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain error returned by managers, the guard and the authenticator
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Validation failed: {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        BoardError::Validation(vec![FieldViolation::new(field, message)])
    }
}

impl From<StoreError> for BoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                if constraint.contains("username") {
                    BoardError::Conflict("Username already exists".to_string())
                } else if constraint.contains("email") {
                    BoardError::Conflict("Email already exists".to_string())
                } else {
                    BoardError::Conflict(format!("Constraint violation: {}", constraint))
                }
            }
            // Dangling parent references are storage failures, not client input errors
            StoreError::ForeignKeyViolation(constraint) => {
                BoardError::Internal(format!("Foreign key violation: {}", constraint))
            }
            StoreError::Backend(msg) => BoardError::Internal(msg),
        }
    }
}

impl From<TokenError> for BoardError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Create(msg) | TokenError::Config(msg) => BoardError::Internal(msg),
            TokenError::InvalidToken(_) | TokenError::InvalidScope { .. } => {
                BoardError::Unauthenticated(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for BoardError {
    fn from(err: PasswordError) -> Self {
        BoardError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<ImageStoreError> for BoardError {
    fn from(err: ImageStoreError) -> Self {
        match err {
            // The file name comes from the client
            ImageStoreError::InvalidFileName(_) => {
                BoardError::invalid("profile_image", "Invalid file name")
            }
            ImageStoreError::Io(e) => BoardError::Internal(format!("Image storage failed: {}", e)),
        }
    }
}

impl From<validator::ValidationErrors> for BoardError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldViolation::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        BoardError::Validation(violations)
    }
}
