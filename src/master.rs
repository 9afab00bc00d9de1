//! Master-key provisioning against an external key-value store.
//!
//! master = SHA-512(MASTER_PREFIX || admin_key || MASTER_SUFFIX)
//! stored under hex(SHA-256(LOOKUP_LABEL))
//!
//! The store is a capability handed in by the caller; nothing here is global.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::error::{KeyError, StoreError};

pub const MASTER_PREFIX: &[u8] = b"guard|master|";
pub const MASTER_SUFFIX: &[u8] = b"|v1";
pub const LOOKUP_LABEL: &[u8] = b"guard|master-key|lookup|v1";

pub const MASTER_KEY_BYTES: usize = 64;

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Process-wide key-value store.
///
/// `set` must be atomic: either the value is stored and `Ok(true)` is
/// returned, or nothing changes.
pub trait KeyValueStore: Send + Sync {
    fn set(&self, key: &str, value: &[u8]) -> Result<bool, StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// In-memory store (for testing and single-process use).
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<bool, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError("lock poisoned".into()))?;
        entries.insert(key.to_owned(), value.to_vec());
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }
}

// ---------------------------------------------------------------------------
// Master key
// ---------------------------------------------------------------------------

pub struct MasterKey(Zeroizing<Vec<u8>>);

impl MasterKey {
    /// Lookup key used for both `set` and `get`.
    pub fn lookup_key() -> String {
        hex::encode(Sha256::digest(LOOKUP_LABEL))
    }

    pub fn derive(admin_key: &[u8]) -> Result<Self, KeyError> {
        if admin_key.is_empty() {
            return Err(KeyError::Empty);
        }
        let mut h = Sha512::new();
        h.update(MASTER_PREFIX);
        h.update(admin_key);
        h.update(MASTER_SUFFIX);
        Ok(Self(Zeroizing::new(h.finalize().to_vec())))
    }

    /// Derive from `admin_key` and write to `store`.
    pub fn provision<S: KeyValueStore + ?Sized>(store: &S, admin_key: &[u8]) -> Result<Self, KeyError> {
        let master = Self::derive(admin_key)?;
        if !store.set(&Self::lookup_key(), master.as_bytes())? {
            tracing::warn!("key store refused the master key");
            return Err(KeyError::MasterKeyRejected);
        }
        tracing::info!("master key provisioned");
        Ok(master)
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, KeyError> {
        match store.get(&Self::lookup_key())? {
            Some(bytes) if !bytes.is_empty() => Ok(Self(Zeroizing::new(bytes))),
            _ => Err(KeyError::MasterKeyUnset),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}
