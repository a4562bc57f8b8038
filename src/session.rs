use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::utils::app_paths::AppPaths;

/// Saved login state. The browser original kept the bearer token in
/// localStorage; here it lives in a JSON file under the app data dir so a
/// login survives across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

pub struct SessionStore {
    session_file: PathBuf,
    data: Option<SessionData>,
}

impl SessionStore {
    pub fn load() -> Result<Self> {
        Self::load_from(AppPaths::session_file()?)
    }

    /// Load from an explicit path. Tests point this at a temp dir.
    pub fn load_from(session_file: PathBuf) -> Result<Self> {
        let data = if session_file.exists() {
            let contents = fs::read_to_string(&session_file)?;
            match serde_json::from_str(&contents) {
                Ok(data) => Some(data),
                Err(e) => {
                    // Corrupt session file should not block startup
                    debug!(target: "session", "discarding unreadable session: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Ok(Self { session_file, data })
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.username.as_str())
    }

    /// Persist a fresh login.
    pub fn store(&mut self, username: &str, token: &str) -> Result<()> {
        let data = SessionData {
            username: username.to_string(),
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        if let Some(parent) = self.session_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.session_file, serde_json::to_string_pretty(&data)?)?;
        info!(target: "session", "session saved for {}", username);
        self.data = Some(data);
        Ok(())
    }

    /// Drop the session and delete the file.
    pub fn clear(&mut self) -> Result<()> {
        if self.session_file.exists() {
            fs::remove_file(&self.session_file)?;
        }
        info!(target: "session", "session cleared");
        self.data = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_store_is_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load_from(dir.path().join("session.json")).unwrap();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_store_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::load_from(path.clone()).unwrap();
        store.store("alice", "tok-123").unwrap();
        assert!(store.is_authenticated());

        let reloaded = SessionStore::load_from(path).unwrap();
        assert_eq!(reloaded.username(), Some("alice"));
        assert_eq!(reloaded.token(), Some("tok-123"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::load_from(path.clone()).unwrap();
        store.store("bob", "tok-456").unwrap();
        store.clear().unwrap();

        assert!(!store.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::load_from(path).unwrap();
        assert!(!store.is_authenticated());
    }
}
