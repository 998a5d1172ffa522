//! Known-user registry
//!
//! Remembers which Telegram users already talked to the bot so the first
//! message of a newcomer can be answered with the welcome screen. Stored as
//! `{"users": [...], "last_updated": ...}`.

use crate::error::Result;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct StoredUsers {
    #[serde(default)]
    users: Vec<i64>,
}

pub struct KnownUsers {
    path: PathBuf,
    users: RwLock<HashSet<i64>>,
    save_lock: Mutex<()>,
}

impl KnownUsers {
    /// Load the registry. A missing or unreadable file gives an empty set.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users = match Self::read(&path).await {
            Ok(users) => users,
            Err(e) => {
                warn!("Failed to load known users from {}: {}", path.display(), e);
                HashSet::new()
            }
        };

        Self {
            path,
            users: RwLock::new(users),
            save_lock: Mutex::new(()),
        }
    }

    async fn read(path: &Path) -> Result<HashSet<i64>> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(HashSet::new());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let stored: StoredUsers = serde_json::from_str(&content)?;
        Ok(stored.users.into_iter().collect())
    }

    pub fn is_new(&self, user_id: i64) -> bool {
        !self.users.read().contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Add a user and persist the registry. Returns false if already known.
    pub async fn register(&self, user_id: i64) -> bool {
        if !self.users.write().insert(user_id) {
            return false;
        }

        info!("New user registered: {}", user_id);
        if let Err(e) = self.save().await {
            warn!("Failed to save known users to {}: {}", self.path.display(), e);
        }
        true
    }

    async fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;

        let mut users: Vec<i64> = self.users.read().iter().copied().collect();
        users.sort_unstable();

        let data = serde_json::json!({
            "users": users,
            "last_updated": Utc::now(),
        });

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&data)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_gives_empty_registry() {
        let dir = tempdir().unwrap();
        let users = KnownUsers::load(dir.path().join("known_users.json")).await;
        assert!(users.is_empty());
        assert!(users.is_new(42));
    }

    #[tokio::test]
    async fn test_register_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("known_users.json");

        let users = KnownUsers::load(&path).await;
        assert!(users.register(42).await);
        assert!(!users.register(42).await);
        assert!(users.register(7).await);
        assert!(!users.is_new(42));

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["users"], serde_json::json!([7, 42]));
        assert!(json.get("last_updated").is_some());

        let reloaded = KnownUsers::load(&path).await;
        assert_eq!(reloaded.len(), 2);
        assert!(!reloaded.is_new(7));
    }

    #[tokio::test]
    async fn test_reads_file_with_naive_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known_users.json");
        tokio::fs::write(
            &path,
            r#"{"users": [111, 222], "last_updated": "2024-05-01T10:20:30.123456"}"#,
        )
        .await
        .unwrap();

        let users = KnownUsers::load(&path).await;
        assert_eq!(users.len(), 2);
        assert!(!users.is_new(222));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("known_users.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let users = KnownUsers::load(&path).await;
        assert!(users.is_empty());
    }
}
