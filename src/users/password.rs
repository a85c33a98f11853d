use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Argon2id PHC string stored in the `password` column. Each call draws a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))
}

/// Checks `plain` against a stored PHC string.
#[cfg(test)]
pub(crate) fn password_matches(plain: &str, stored: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    PasswordHash::new(stored)
        .map(|phc| Argon2::default().verify_password(plain.as_bytes(), &phc).is_ok())
        .unwrap_or(false)
}
