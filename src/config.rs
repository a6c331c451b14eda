use std::path::PathBuf;

use crate::errors::{CodezapError, Result};
use crate::storage::models::DEFAULT_PAGE_SIZE;

pub const HOME_ENV: &str = "CODEZAP_HOME";

pub struct AppPaths {
    pub base_dir: PathBuf,
    pub db_path: PathBuf,
}

impl AppPaths {
    /// Resolves `$CODEZAP_HOME`, falling back to `~/.codezap`.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_base(PathBuf::from(dir)));
        }
        let home = dirs::home_dir().ok_or_else(|| {
            CodezapError::InvalidInput(format!(
                "could not determine home directory; set {}",
                HOME_ENV
            ))
        })?;
        Ok(Self::from_base(home.join(".codezap")))
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            db_path: base.join("codezap.db"),
            base_dir: base,
        }
    }
}

/// Argon2id cost parameters used when hashing new passwords.
#[derive(Debug, Clone, PartialEq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub page_size: i64,
    pub argon2: Argon2Params,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            argon2: Argon2Params::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base() {
        let paths = AppPaths::from_base(PathBuf::from("/tmp/test-codezap"));
        assert_eq!(paths.base_dir, PathBuf::from("/tmp/test-codezap"));
        assert_eq!(paths.db_path, PathBuf::from("/tmp/test-codezap/codezap.db"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.argon2.iterations, 2);
    }
}
