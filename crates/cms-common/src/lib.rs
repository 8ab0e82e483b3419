//! Centralized directory structure management for the CMS
//!
//! Directory layout:
//! ```text
//! cms_data/
//! ├── data/        # Documents served by the store
//! └── users.yml    # username -> bcrypt hash
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the CMS root directory
pub const ROOT_ENV: &str = "CMS_ROOT";

/// Fallback root when neither the environment nor the config file names one
pub const DEFAULT_ROOT: &str = "cms_data";

#[derive(Deserialize, Debug, Default)]
struct CmsConfigFile {
    cms_root: Option<PathBuf>,
}

/// Get the global configuration path
fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cms").join("config.json"))
}

/// Read the persisted root from a config file at `path`
pub fn read_root_from(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<CmsConfigFile>(&content) {
            Ok(config) => config.cms_root,
            Err(e) => {
                warn!("Failed to parse config file at {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read config file at {:?}: {}", path, e);
            None
        }
    }
}

/// Load the persistent root from the user's config dir
pub fn load_persistent_root() -> Option<PathBuf> {
    read_root_from(&get_config_path()?)
}

/// Pick the root: explicit env value first, then the persisted one, then the default
pub fn resolve_root(env_value: Option<String>, persisted: Option<PathBuf>) -> PathBuf {
    env_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or(persisted)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))
}

/// Get the CMS root directory from environment, persistent config, or default
pub fn cms_root() -> PathBuf {
    resolve_root(std::env::var(ROOT_ENV).ok(), load_persistent_root())
}

/// Document store directory under `root`
pub fn data_dir_in(root: &Path) -> PathBuf {
    root.join("data")
}

/// Credential file under `root`
pub fn users_path_in(root: &Path) -> PathBuf {
    root.join("users.yml")
}

/// Ensure a single directory exists
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Initialize the directory structure under `root` and return it canonicalized
pub fn init_structure(root: &Path) -> anyhow::Result<PathBuf> {
    ensure_dir(root)?;
    ensure_dir(&data_dir_in(root))?;

    let canonical = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    info!("CMS directory structure initialized at: {:?}", canonical);

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_root_precedence() {
        let persisted = Some(PathBuf::from("/srv/cms"));

        assert_eq!(
            resolve_root(Some("/tmp/env-root".into()), persisted.clone()),
            PathBuf::from("/tmp/env-root")
        );
        assert_eq!(resolve_root(None, persisted.clone()), PathBuf::from("/srv/cms"));
        assert_eq!(resolve_root(Some(String::new()), persisted), PathBuf::from("/srv/cms"));
        assert_eq!(resolve_root(None, None), PathBuf::from(DEFAULT_ROOT));
    }

    #[test]
    fn test_read_persisted_root() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");

        assert!(read_root_from(&config_path).is_none());

        fs::write(&config_path, r#"{ "cms_root": "/srv/docs" }"#).unwrap();
        assert_eq!(read_root_from(&config_path), Some(PathBuf::from("/srv/docs")));

        fs::write(&config_path, "{}").unwrap();
        assert!(read_root_from(&config_path).is_none());
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        assert!(read_root_from(&config_path).is_none());
    }

    #[test]
    fn test_init_structure_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("cms");

        let canonical = init_structure(&root).unwrap();

        assert!(data_dir_in(&root).is_dir());
        assert!(canonical.is_absolute());
        assert!(users_path_in(&root).ends_with("users.yml"));
    }
}
