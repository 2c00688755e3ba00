use crate::errors::AppResult;

/// bcrypt only reads the first 72 bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt digest in modular crypt form (`$2b$<cost>$...`), fresh salt per call.
pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// Spend one hash at `cost` and reject. Used when the username is unknown so
/// the response takes as long as a wrong password would.
pub fn reject_unknown_user(password: &str, cost: u32) -> bool {
    if let Err(e) = bcrypt::hash(password, cost) {
        tracing::debug!(error = %e, "dummy hash failed");
    }
    false
}
