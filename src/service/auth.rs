use crate::credentials::Credentials;
use crate::errors::{CodezapError, Result};
use crate::password;
use crate::storage::MemberStorage;
use crate::storage::models::MemberIdentity;

/// Well-formed hash at the default cost that no password verifies against.
/// Unknown emails are checked against it so they take as long as known ones.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                          AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Checks an email/password pair against the stored member. Unknown emails
/// and wrong passwords fail the same way.
pub fn authenticate<S: MemberStorage>(
    storage: &S,
    credentials: &Credentials,
) -> Result<MemberIdentity> {
    let member = storage.find_member_by_email(&credentials.email)?;
    let stored_hash = member
        .as_ref()
        .map_or(DUMMY_HASH, |m| m.password_hash.as_str());
    let verified = password::verify_password(&credentials.password, stored_hash)?;
    match member {
        Some(member) if verified => Ok(MemberIdentity::from(&member)),
        Some(member) => {
            log::debug!("password mismatch for member {}", member.id);
            Err(CodezapError::AuthenticationFailed)
        }
        None => Err(CodezapError::AuthenticationFailed),
    }
}

/// Decodes a credential token, then authenticates it.
pub fn authenticate_token<S: MemberStorage>(storage: &S, token: &str) -> Result<MemberIdentity> {
    let credentials = Credentials::decode(token)?;
    authenticate(storage, &credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::{self, email_of};
    use crate::storage::sqlite::SqliteStorage;

    #[test]
    fn test_authenticate_success() {
        let storage = SqliteStorage::in_memory().unwrap();
        let identity = fixtures::signed_up(&storage, "zappy");
        let credentials = Credentials::new(email_of("zappy"), "password1");
        assert_eq!(authenticate(&storage, &credentials).unwrap(), identity);
    }

    #[test]
    fn test_authenticate_by_name_is_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        fixtures::signed_up(&storage, "zappy");
        let result = authenticate(&storage, &Credentials::new("zappy", "password1"));
        assert!(matches!(result, Err(CodezapError::AuthenticationFailed)));
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let storage = SqliteStorage::in_memory().unwrap();
        fixtures::signed_up(&storage, "zappy");
        let credentials = Credentials::new(email_of("zappy"), "wrongpassword");
        let result = authenticate(&storage, &credentials);
        assert!(matches!(result, Err(CodezapError::AuthenticationFailed)));
    }

    #[test]
    fn test_authenticate_unknown_email() {
        let storage = SqliteStorage::in_memory().unwrap();
        fixtures::signed_up(&storage, "zappy");
        let credentials = Credentials::new("nobody@code.zap", "password1");
        let result = authenticate(&storage, &credentials);
        assert!(matches!(result, Err(CodezapError::AuthenticationFailed)));
    }

    #[test]
    fn test_dummy_hash_parses_and_never_verifies() {
        assert!(!password::verify_password("password1", DUMMY_HASH).unwrap());
        assert!(!password::verify_password("", DUMMY_HASH).unwrap());
    }

    #[test]
    fn test_authenticate_token() {
        let storage = SqliteStorage::in_memory().unwrap();
        let identity = fixtures::signed_up(&storage, "zappy");
        let token = Credentials::new(email_of("zappy"), "password1").encode();
        assert_eq!(authenticate_token(&storage, &token).unwrap(), identity);

        let wrong = Credentials::new("wrong@email.kr", "nopassword").encode();
        assert!(matches!(
            authenticate_token(&storage, &wrong),
            Err(CodezapError::AuthenticationFailed)
        ));
        assert!(matches!(
            authenticate_token(&storage, "not base64!"),
            Err(CodezapError::AuthenticationFailed)
        ));
    }
}
