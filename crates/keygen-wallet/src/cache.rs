//! Per-path memoization of derived keys.
//!
//! Each canonical path owns a slot. The map lock is held only long enough
//! to find or create the slot; the derivation itself runs under the slot's
//! own once-cell, so concurrent requests for the same uncached path are
//! serialized (one derives, the rest observe its result) while requests
//! for different paths proceed independently. A failed derivation leaves
//! its slot empty, so no error is ever cached.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::WalletError;
use crate::keys::DerivedKey;

type Slot = Arc<OnceCell<Arc<DerivedKey>>>;

/// Canonical path string to derived key.
#[derive(Default)]
pub struct DerivationCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl DerivationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously derived key.
    pub fn get(&self, path: &str) -> Option<Arc<DerivedKey>> {
        let slot = self.slots.lock().get(path).cloned()?;
        slot.get().cloned()
    }

    /// Store a key under its own path.
    ///
    /// If the path is already populated the existing key wins and is
    /// returned, so a path never maps to two distinct nodes.
    pub fn insert(&self, key: DerivedKey) -> Arc<DerivedKey> {
        let slot = self.slot(key.path());
        Arc::clone(slot.get_or_init(move || Arc::new(key)))
    }

    /// Return the cached key for `path`, running `derive` only if no key
    /// has been stored yet.
    pub fn get_or_derive<F>(&self, path: &str, derive: F) -> Result<Arc<DerivedKey>, WalletError>
    where
        F: FnOnce() -> Result<DerivedKey, WalletError>,
    {
        let slot = self.slot(path);
        let key = slot.get_or_try_init(|| {
            let key = derive()?;
            tracing::debug!(path, "derived key");
            Ok::<_, WalletError>(Arc::new(key))
        })?;
        Ok(Arc::clone(key))
    }

    /// Number of populated paths.
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|s| s.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, path: &str) -> Slot {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(path.to_string()).or_default())
    }
}

impl fmt::Debug for DerivationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationCache")
            .field("cached_keys", &self.len())
            .finish()
    }
}
