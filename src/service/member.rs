use crate::config::Argon2Params;
use crate::credentials::Credentials;
use crate::errors::{CodezapError, Result};
use crate::password;
use crate::storage::MemberStorage;
use crate::storage::models::{MemberIdentity, NewMember};
use super::{auth, required};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Emails travel as the user-id half of a basic-auth token, which cannot
/// hold a `:`.
fn valid_email(email: &str) -> Result<String> {
    let email = required("email", email)?;
    if email.contains(':') {
        return Err(CodezapError::InvalidInput("email must not contain ':'".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(CodezapError::InvalidInput(format!(
            "'{}' is not an email address",
            email
        ))),
    }
}

pub fn signup<S: MemberStorage>(
    storage: &S,
    params: &Argon2Params,
    email: &str,
    password: &str,
    name: &str,
) -> Result<MemberIdentity> {
    let email = valid_email(email)?;
    let name = required("name", name)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CodezapError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if storage.member_exists_by_email(&email)? {
        return Err(CodezapError::Conflict(format!("email '{}' is already registered", email)));
    }
    if storage.member_exists_by_name(&name)? {
        return Err(CodezapError::Conflict(format!("member name '{}' is taken", name)));
    }
    let password_hash = password::hash_password(password, params)?;
    let member = storage.insert_member(NewMember {
        email,
        name,
        password_hash,
    })?;
    log::info!("member {} signed up as '{}'", member.id, member.name);
    Ok(MemberIdentity::from(&member))
}

pub fn is_unique_email<S: MemberStorage>(storage: &S, email: &str) -> Result<bool> {
    Ok(!storage.member_exists_by_email(email.trim())?)
}

pub fn is_unique_name<S: MemberStorage>(storage: &S, name: &str) -> Result<bool> {
    Ok(!storage.member_exists_by_name(name.trim())?)
}

/// Authenticates and hands back the token to present on later calls.
pub fn login<S: MemberStorage>(storage: &S, email: &str, password: &str) -> Result<String> {
    let credentials = Credentials::new(email.trim(), password);
    let identity = auth::authenticate(storage, &credentials)?;
    log::info!("member {} logged in", identity.id);
    Ok(credentials.encode())
}
