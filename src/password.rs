use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::Argon2Params;
use crate::errors::{CodezapError, Result};

fn build_argon2(params: &Argon2Params) -> Result<Argon2<'static>> {
    let argon2_params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
        .map_err(|err| CodezapError::Password(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params))
}

/// Hashes `password` with a fresh random salt into a PHC string.
pub fn hash_password(password: &str, params: &Argon2Params) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = build_argon2(params)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| CodezapError::Password(err.to_string()))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. The cost parameters are read
/// from the stored hash, so hashes made with older settings still verify.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| CodezapError::Password(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
