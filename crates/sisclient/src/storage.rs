//! Persisted token store.
//!
//! Holds the access/refresh token pair and, in mock mode, the current mock
//! user id. The store is a process-wide concurrent map optionally mirrored to
//! a JSON file so tokens survive restarts; all three keys are cleared
//! together on logout or unrecoverable refresh failure.

use crate::error::ApiError;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const MOCK_USER_ID_KEY: &str = "mock_user_id";

/// Durable key-value storage for client-side auth state.
pub struct TokenStore {
    entries: DashMap<String, String>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Creates a store that lives only in memory (used by tests and callers
    /// that manage persistence themselves).
    pub fn in_memory() -> Self {
        Self {
            entries: DashMap::new(),
            path: None,
        }
    }

    /// Opens a file-backed store, loading any previously persisted state.
    pub fn at_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let stored: BTreeMap<String, String> = serde_json::from_str(&content)?;
            for (key, value) in stored {
                entries.insert(key, value);
            }
        }
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_access_token(&self, access: &str) {
        self.entries
            .insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        self.persist();
    }

    /// Stores a full token pair, e.g. after login.
    pub fn set_tokens(&self, access: &str, refresh: &str) {
        self.entries
            .insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        self.entries
            .insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        self.persist();
    }

    pub fn mock_user_id(&self) -> Option<i64> {
        self.get(MOCK_USER_ID_KEY).and_then(|v| v.parse().ok())
    }

    pub fn set_mock_user_id(&self, id: i64) {
        self.entries
            .insert(MOCK_USER_ID_KEY.to_string(), id.to_string());
        self.persist();
    }

    /// Clears all stored auth state.
    pub fn clear(&self) {
        self.entries.remove(ACCESS_TOKEN_KEY);
        self.entries.remove(REFRESH_TOKEN_KEY);
        self.entries.remove(MOCK_USER_ID_KEY);
        self.persist();
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Rewrites the backing file, if any. Persistence failures are logged
    /// rather than propagated; the in-memory state stays authoritative.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let serialized = match serde_json::to_string_pretty(&snapshot) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize token store");
                return;
            }
        };
        if let Err(e) = fs::write(path, serialized) {
            warn!(error = %e, path = %path.display(), "Failed to persist token store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_cleared_together() {
        let store = TokenStore::in_memory();
        store.set_tokens("acc", "ref");
        store.set_mock_user_id(4);
        assert_eq!(store.access_token().as_deref(), Some("acc"));
        assert_eq!(store.refresh_token().as_deref(), Some("ref"));
        assert_eq!(store.mock_user_id(), Some(4));

        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.mock_user_id().is_none());
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = TokenStore::at_path(&path).unwrap();
        store.set_tokens("mock-access-4", "mock-refresh-4");
        store.set_mock_user_id(4);
        drop(store);

        let reopened = TokenStore::at_path(&path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("mock-access-4"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("mock-refresh-4"));
        assert_eq!(reopened.mock_user_id(), Some(4));
    }
}
