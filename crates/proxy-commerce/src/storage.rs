//! Client-side cart persistence.
//!
//! Cart contents and coupon are persisted as a JSON snapshot keyed by the
//! user/session and rehydrated on load. No server-side cart persistence is
//! assumed; the backend is pluggable behind [`CartStorage`].

use crate::cart::{AppliedCoupon, CartItem};
use crate::catalog::TabKey;
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Storage operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to serialize/deserialize a snapshot.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Backend(String),
}

/// Persisted form of the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CartSnapshot {
    pub tabs: BTreeMap<TabKey, Vec<CartItem>>,
    pub coupon: Option<AppliedCoupon>,
    pub currency: Currency,
}

/// Key-value persistence for cart snapshots.
pub trait CartStorage: Send + Sync {
    /// Load the snapshot for a session key, if one exists.
    fn load(&self, key: &str) -> Result<Option<CartSnapshot>, StorageError>;

    /// Persist the snapshot for a session key.
    fn save(&self, key: &str, snapshot: &CartSnapshot) -> Result<(), StorageError>;

    /// Drop the snapshot for a session key.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage backend.
///
/// Values are stored JSON-serialized, matching what a browser-storage or
/// key-value backend would hold.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<CartSnapshot>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        match entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, snapshot: &CartSnapshot) -> Result<(), StorageError> {
        let raw = serde_json::to_string(snapshot)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), raw);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
