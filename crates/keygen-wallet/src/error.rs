//! Wallet error types.

use keygen_core::KeyError;
use thiserror::Error;

/// Errors that can occur while deriving, exporting or persisting keys.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Path, derivation, encoding or authentication failure.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Sealed blob is too short to hold a nonce and tag.
    #[error("corrupted blob: {0}")]
    CorruptedBlob(String),

    /// Cipher setup or sealing failure.
    #[error("encryption: {0}")]
    Encryption(String),

    /// Invalid BIP-39 mnemonic phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// A saver could not deliver the export.
    #[error("save to {sink} failed: {reason}")]
    Save {
        /// Saver name.
        sink: &'static str,
        /// Failure detail.
        reason: String,
    },
}

impl From<std::io::Error> for WalletError {
    fn from(e: std::io::Error) -> Self {
        WalletError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Serialization(e.to_string())
    }
}
