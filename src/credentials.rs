use base64::{Engine as _, engine::general_purpose};

use crate::errors::{CodezapError, Result};

/// Name of the cookie the credential token travels in.
pub const COOKIE_NAME: &str = "Authorization";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// `base64(email ":" password)`, the basic-auth encoding.
    pub fn encode(&self) -> String {
        general_purpose::STANDARD.encode(format!("{}:{}", self.email, self.password))
    }

    /// Splits at the first `:`, so the email can never contain one while the
    /// password may. Every malformed token is reported as a failed
    /// authentication.
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|_| CodezapError::AuthenticationFailed)?;
        let text = String::from_utf8(bytes).map_err(|_| CodezapError::AuthenticationFailed)?;
        let (email, password) = text
            .split_once(':')
            .ok_or(CodezapError::AuthenticationFailed)?;
        Ok(Self::new(email, password))
    }
}

/// Finds the credential cookie in a `Cookie` header value (`a=1; b=2`).
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value)
}
