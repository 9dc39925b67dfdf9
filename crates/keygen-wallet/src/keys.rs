//! Seed material and derived key values.
//!
//! A [`Seed`] is the 64-byte BIP-39 seed. A [`DerivedKey`] is the immutable
//! result of walking to one path: the canonical path string, the raw private
//! key and the extended-key node needed to derive further children.

use std::fmt;

use bitcoin::bip32::Xpriv;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// BIP-39 seed length in bytes.
pub const SEED_LEN: usize = 64;

/// A 64-byte BIP-39 seed.
///
/// Secret material is zeroized on drop to prevent leaking key material
/// in freed memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// Stretch a validated mnemonic and passphrase into a seed.
    pub fn from_mnemonic(mnemonic: &bip39::Mnemonic, passphrase: &str) -> Self {
        Self {
            bytes: mnemonic.to_seed(passphrase),
        }
    }

    /// Create a seed from raw bytes.
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self { bytes }
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.bytes
    }

    /// Lowercase hex, as written to exports.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Clone for Seed {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}

/// One node of the derivation tree, fixed at creation.
pub struct DerivedKey {
    path: String,
    secret: Zeroizing<[u8; 32]>,
    node: Xpriv,
}

impl DerivedKey {
    pub fn new(path: impl Into<String>, node: Xpriv) -> Self {
        Self {
            path: path.into(),
            secret: Zeroizing::new(node.private_key.secret_bytes()),
            node,
        }
    }

    /// Canonical path, e.g. `m/44'/0'/0'/0/0`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw 32-byte private key.
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Private key as lowercase hex, the EVM export representation.
    pub fn hex_key(&self) -> String {
        hex::encode(*self.secret)
    }

    /// The extended-key node.
    pub fn node(&self) -> &Xpriv {
        &self.node
    }

    /// Standard base58 extended-key serialization (`xprv...`).
    pub fn extended_key(&self) -> String {
        self.node.to_string()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("path", &self.path)
            .field("depth", &self.node.depth)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
