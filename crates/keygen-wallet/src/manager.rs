//! The five-level BIP-44 path walk.
//!
//! A [`KeyManager`] owns one recovery phrase, its seed and a
//! [`DerivationCache`]. Every accessor resolves its path one level at a
//! time from the master node down, checking the cache at each level, so a
//! request for a deep path reuses whatever ancestors are already cached.

use std::fmt;
use std::sync::Arc;

use bitcoin::Network;
use keygen_core::constants::MASTER_PATH;
use keygen_core::path::canonical;
use keygen_core::{Bip32Deriver, Bip44Path, ChildDeriver, ChildIndex, CoinType, Purpose};
use zeroize::Zeroizing;

use crate::cache::DerivationCache;
use crate::error::WalletError;
use crate::keys::{DerivedKey, Seed};
use crate::mnemonic::parse_mnemonic;

/// Derives and memoizes keys for one generation session.
pub struct KeyManager {
    mnemonic: Zeroizing<String>,
    passphrase: Zeroizing<String>,
    seed: Seed,
    deriver: Arc<dyn ChildDeriver>,
    cache: DerivationCache,
}

impl KeyManager {
    /// Validate `mnemonic` and stretch it with `passphrase` into a mainnet
    /// key manager.
    pub fn new(mnemonic: &str, passphrase: &str) -> Result<Self, WalletError> {
        Self::with_network(mnemonic, passphrase, Network::Bitcoin)
    }

    /// Like [`KeyManager::new`], with extended keys serialized for `network`.
    pub fn with_network(
        mnemonic: &str,
        passphrase: &str,
        network: Network,
    ) -> Result<Self, WalletError> {
        Self::with_deriver(mnemonic, passphrase, Arc::new(Bip32Deriver::new(network)))
    }

    /// Build a manager over a caller-supplied derivation primitive.
    pub fn with_deriver(
        mnemonic: &str,
        passphrase: &str,
        deriver: Arc<dyn ChildDeriver>,
    ) -> Result<Self, WalletError> {
        let parsed = parse_mnemonic(mnemonic)?;
        let seed = Seed::from_mnemonic(&parsed, passphrase);
        Ok(Self {
            mnemonic: Zeroizing::new(parsed.to_string()),
            passphrase: Zeroizing::new(passphrase.to_string()),
            seed,
            deriver,
            cache: DerivationCache::new(),
        })
    }

    /// The normalized recovery phrase.
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Base58 serialization of the master node.
    pub fn root_key(&self) -> Result<String, WalletError> {
        Ok(self.master()?.extended_key())
    }

    /// Number of paths derived so far.
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    /// Root node, path `m`.
    pub fn master(&self) -> Result<Arc<DerivedKey>, WalletError> {
        self.cache.get_or_derive(MASTER_PATH, || {
            let node = self.deriver.master(self.seed.as_bytes())?;
            Ok(DerivedKey::new(MASTER_PATH, node))
        })
    }

    /// `m/p'`
    pub fn purpose(&self, purpose: Purpose) -> Result<Arc<DerivedKey>, WalletError> {
        self.walk(&[purpose.child()])
    }

    /// `m/p'/c'`
    pub fn coin_type(
        &self,
        purpose: Purpose,
        coin_type: CoinType,
    ) -> Result<Arc<DerivedKey>, WalletError> {
        self.walk(&[purpose.child(), coin_type.child()])
    }

    /// `m/p'/c'/a'`
    pub fn account(
        &self,
        purpose: Purpose,
        coin_type: CoinType,
        account: u32,
    ) -> Result<Arc<DerivedKey>, WalletError> {
        self.walk(&[
            purpose.child(),
            coin_type.child(),
            ChildIndex::hardened(account.into())?,
        ])
    }

    /// `m/p'/c'/a'/ch`
    pub fn change(
        &self,
        purpose: Purpose,
        coin_type: CoinType,
        account: u32,
        change: u32,
    ) -> Result<Arc<DerivedKey>, WalletError> {
        self.walk(&[
            purpose.child(),
            coin_type.child(),
            ChildIndex::hardened(account.into())?,
            ChildIndex::normal(change.into())?,
        ])
    }

    /// `m/p'/c'/a'/ch/i`
    pub fn key(
        &self,
        purpose: Purpose,
        coin_type: CoinType,
        account: u32,
        change: u32,
        index: u32,
    ) -> Result<Arc<DerivedKey>, WalletError> {
        let path = Bip44Path::new(purpose, coin_type, account, change, index)?;
        self.derive(&path)
    }

    /// Leaf key for an already validated path.
    pub fn derive(&self, path: &Bip44Path) -> Result<Arc<DerivedKey>, WalletError> {
        self.walk(&path.components())
    }

    fn walk(&self, components: &[ChildIndex]) -> Result<Arc<DerivedKey>, WalletError> {
        let mut parent = self.master()?;
        for depth in 1..=components.len() {
            let path = canonical(&components[..depth]);
            let index = components[depth - 1];
            let node = {
                let parent = Arc::clone(&parent);
                self.cache.get_or_derive(&path, || {
                    let child = self.deriver.child(parent.node(), index)?;
                    Ok(DerivedKey::new(path.clone(), child))
                })?
            };
            parent = node;
        }
        Ok(parent)
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("mnemonic", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .field("cache", &self.cache)
            .finish()
    }
}
