//! [`UserStore`]: in-memory, thread-safe user storage.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::User;

/// Thread-safe map of users keyed by id.
///
/// Cloning is cheap; every clone shares the same map.
#[derive(Clone, Debug, Default)]
pub struct UserStore {
    inner: Arc<RwLock<HashMap<String, User>>>,
}

impl UserStore {
    /// Create a new, empty [`UserStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `user`, replacing any user with the same id.
    pub async fn insert(&self, user: User) {
        self.inner.write().await.insert(user.id.clone(), user);
    }

    /// Look up a user by id.
    pub async fn get(&self, id: &str) -> Option<User> {
        self.inner.read().await.get(id).cloned()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_on_creation() {
        let store = UserStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = UserStore::new();
        store.insert(user("u-1")).await;
        assert_eq!(store.get("u-1").await.map(|u| u.name), Some("Alice".to_owned()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = UserStore::new();
        let clone = store.clone();
        clone.insert(user("u-2")).await;
        assert!(store.get("u-2").await.is_some());
    }
}
