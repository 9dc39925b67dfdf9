//! # keygen-wallet — reproducible multi-chain key export.
//!
//! Walks the five BIP-44 levels from a BIP-39 seed with per-path
//! memoization, renders the derived keys for Bitcoin and EVM chains, and
//! seals the export with a password before handing it to a saver.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`keys`] — `Seed`, `DerivedKey`
//! - [`cache`] — `DerivationCache`, at most one derivation per path
//! - [`manager`] — `KeyManager`, the five-level path walk
//! - [`mnemonic`] — BIP-39 phrase generation and validation
//! - [`export`] — `ExportFormatter`, structured and human-readable output
//! - [`encryption`] — AES-256-GCM sealed blobs
//! - [`save`] — `Saver` capability with file-system and vault sinks
//! - [`config`] — run configuration and validation

pub mod cache;
pub mod config;
pub mod encryption;
pub mod error;
pub mod export;
pub mod keys;
pub mod manager;
pub mod mnemonic;
pub mod save;

// Re-exports for convenient access
pub use cache::DerivationCache;
pub use config::{KeygenConfig, VaultConfig};
pub use encryption::{EncryptedBlob, open, seal};
pub use error::WalletError;
pub use export::{ExportDocument, ExportFormatter, ExportRecord, ExportRequest};
pub use keys::{DerivedKey, Seed};
pub use manager::KeyManager;
pub use mnemonic::{generate_mnemonic, normalize_mnemonic, parse_mnemonic};
pub use save::{ExportPayload, FileSystemSaver, SaveContext, Saver, SaverSet, VaultSaver};
