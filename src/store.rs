//! Per-conversation and per-user state.
//!
//! The bot keeps no state between turns itself. Dialog progress is stored
//! under the conversation, the profile under the user, both as JSON values in
//! a [`StateStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Where a value lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateScope {
    Conversation(String),
    User(String),
}

/// Well-known keys.
pub mod keys {
    pub const FINDER_STATE: &str = "finder_state";
    pub const USER_PROFILE: &str = "user_profile";
}

/// Backend-agnostic key-value store for bot state.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, scope: &StateScope, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    async fn set(&self, scope: &StateScope, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    async fn delete(&self, scope: &StateScope, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize a typed value.
pub async fn load<T: DeserializeOwned>(
    store: &dyn StateStore,
    scope: &StateScope,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(scope, key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize and write a typed value.
pub async fn save<T: Serialize>(
    store: &dyn StateStore,
    scope: &StateScope,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_value(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(scope, key, json).await
}

/// In-process store; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<(StateScope, String), serde_json::Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, scope: &StateScope, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(scope.clone(), key.to_string())).cloned())
    }

    async fn set(&self, scope: &StateScope, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert((scope.clone(), key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, scope: &StateScope, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .remove(&(scope.clone(), key.to_string()));
        Ok(())
    }
}
