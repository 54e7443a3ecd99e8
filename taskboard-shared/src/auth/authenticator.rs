/// Username/password verification
///
/// `authenticate` reports "no such user", "no password set", "wrong
/// password" and an unreadable stored hash identically as `Ok(None)`. Only
/// storage problems are errors.

use tracing::warn;

use super::password::verify_password;
use crate::error::BoardResult;
use crate::models::user::User;
use crate::store::Store;

/// Looks up `username` and verifies `password` against its stored hash
///
/// # Returns
///
/// `Some(user)` on a match, `None` otherwise
pub async fn authenticate(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> BoardResult<Option<User>> {
    let Some(user) = store.find_user_by_username(username).await? else {
        return Ok(None);
    };

    // Externally provisioned accounts have no local password
    let Some(hash) = user.password_hash.as_deref() else {
        return Ok(None);
    };

    match verify_password(password, hash) {
        Ok(true) => {}
        Ok(false) => return Ok(None),
        Err(e) => {
            warn!(user_id = user.id, error = %e, "Stored password hash is unusable");
            return Ok(None);
        }
    }

    Ok(Some(user))
}
