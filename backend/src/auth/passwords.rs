use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use tracing::warn;

/// Checks `password` against a PHC-formatted argon2 hash. An unparsable hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => parsed_hash,
        Err(err) => {
            warn!(hash_error = %err, "auth: stored password hash is not parsable");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
