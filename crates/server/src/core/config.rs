//! CMS server configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::auth::{AuthManager, SessionStore};
use crate::core::documents::DocumentStore;

pub const DEFAULT_PORT: u16 = 4567;

/// Configuration for the CMS server
#[derive(Clone, Debug)]
pub struct CmsConfig {
    /// Directory holding the documents
    pub data_dir: PathBuf,
    /// YAML credential file (username -> bcrypt hash)
    pub users_path: PathBuf,
    /// Port to listen on
    pub port: u16,
    /// Idle lifetime of a session
    pub session_ttl: chrono::Duration,
}

impl Default for CmsConfig {
    fn default() -> Self {
        let root = cms_common::cms_root();
        Self {
            data_dir: cms_common::data_dir_in(&root),
            users_path: cms_common::users_path_in(&root),
            port: std::env::var("CMS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            session_ttl: std::env::var("CMS_SESSION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(chrono::Duration::hours)
                .unwrap_or_else(|| chrono::Duration::hours(24)),
        }
    }
}

impl CmsConfig {
    /// Create config rooted at an explicit base directory
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        Self {
            data_dir: cms_common::data_dir_in(base),
            users_path: cms_common::users_path_in(base),
            ..Self::default()
        }
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        if let Some(parent) = self.users_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: CmsConfig,
    pub documents: Arc<DocumentStore>,
    pub auth: Arc<AuthManager>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: CmsConfig) -> Self {
        Self {
            documents: Arc::new(DocumentStore::new(config.data_dir.clone())),
            auth: Arc::new(AuthManager::new(config.users_path.clone())),
            sessions: Arc::new(SessionStore::new(config.session_ttl)),
            config,
        }
    }
}
