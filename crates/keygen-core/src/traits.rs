//! Trait seams between the key manager and its external primitives.
//!
//! - [`ChildDeriver`] — BIP-32 master/child derivation (`Bip32Deriver` implements)

use bitcoin::bip32::Xpriv;
use bitcoin::secp256k1::{All, Secp256k1};
use bitcoin::{Network, NetworkKind};

use crate::error::KeyError;
use crate::path::ChildIndex;

/// The HMAC-based extended-key primitive.
///
/// The key manager owns the path policy and caching; implementors only
/// answer "master node from seed" and "child of node at index".
pub trait ChildDeriver: Send + Sync {
    /// Build the master node from a BIP-39 seed.
    fn master(&self, seed: &[u8]) -> Result<Xpriv, KeyError>;

    /// Derive the child of `parent` at `index`.
    ///
    /// Hardened indices reach the primitive with the bias already applied.
    fn child(&self, parent: &Xpriv, index: ChildIndex) -> Result<Xpriv, KeyError>;
}

/// [`ChildDeriver`] backed by the `bitcoin` crate's BIP-32 implementation.
pub struct Bip32Deriver {
    secp: Secp256k1<All>,
    network: NetworkKind,
}

impl Bip32Deriver {
    /// `network` selects the extended-key version bytes (`xprv` or `tprv`).
    pub fn new(network: Network) -> Self {
        Self {
            secp: Secp256k1::new(),
            network: network.into(),
        }
    }
}

impl Default for Bip32Deriver {
    fn default() -> Self {
        Self::new(Network::Bitcoin)
    }
}

impl ChildDeriver for Bip32Deriver {
    fn master(&self, seed: &[u8]) -> Result<Xpriv, KeyError> {
        Xpriv::new_master(self.network, seed).map_err(|e| KeyError::Derivation(e.to_string()))
    }

    fn child(&self, parent: &Xpriv, index: ChildIndex) -> Result<Xpriv, KeyError> {
        parent
            .derive_priv(&self.secp, &[index.child_number()])
            .map_err(|e| KeyError::Derivation(format!("child {index}: {e}")))
    }
}
