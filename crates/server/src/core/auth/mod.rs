//! Authentication Module
//!
//! Verifies credentials against the YAML credential file and tracks
//! per-caller sessions. Credentials are read fresh on every sign-in
//! attempt; nothing is cached.

pub mod handlers;
pub mod middleware;
pub mod session;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

pub use session::{SessionData, SessionStore};

/// username -> bcrypt hash
pub type Credentials = HashMap<String, String>;

/// Auth manager handles credential verification
pub struct AuthManager {
    users_path: PathBuf,
}

impl AuthManager {
    pub fn new(users_path: impl Into<PathBuf>) -> Self {
        let users_path = users_path.into();
        info!("[Auth] Credentials file: {:?}", users_path);
        Self { users_path }
    }

    /// Load the credential mapping. A missing file is an empty mapping.
    pub async fn load_credentials(&self) -> Result<Credentials> {
        let raw = match fs::read_to_string(&self.users_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("[Auth] No credentials file at {:?}", self.users_path);
                return Ok(Credentials::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.users_path))
            }
        };

        if raw.trim().is_empty() {
            return Ok(Credentials::new());
        }

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse credentials in {:?}", self.users_path))
    }

    /// True only if `username` is known and `password` matches its hash
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let credentials = self.load_credentials().await?;

        let Some(hash) = credentials.get(username) else {
            warn!("[Auth] Sign-in attempt for unknown user {}", username);
            return Ok(false);
        };

        match bcrypt::verify(password, hash) {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!("[Auth] Failed sign-in attempt for {}", username);
                Ok(false)
            }
            Err(e) => {
                warn!("[Auth] Stored hash for {} is unusable: {}", username, e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_users(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("users.yml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_verify_known_user() {
        let dir = TempDir::new().unwrap();
        let hash = bcrypt::hash("secret", 4).unwrap();
        let auth = AuthManager::new(write_users(&dir, &format!("admin: \"{}\"\n", hash)));

        assert!(auth.verify("admin", "secret").await.unwrap());
        assert!(!auth.verify("admin", "wrong").await.unwrap());
        assert!(!auth.verify("nobody", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_fails_closed() {
        let dir = TempDir::new().unwrap();
        let auth = AuthManager::new(write_users(&dir, "admin: not-a-bcrypt-hash\n"));

        assert!(!auth.verify("admin", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let auth = AuthManager::new(dir.path().join("absent.yml"));

        assert!(auth.load_credentials().await.unwrap().is_empty());
        assert!(!auth.verify("admin", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_unparseable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let auth = AuthManager::new(write_users(&dir, "- just\n- a list\n"));

        assert!(auth.verify("admin", "secret").await.is_err());
    }
}
