//! Protocol constants shared across the key-gen crates.

/// Bias added to a child index to request hardened derivation (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Largest index accepted at an unhardened level.
pub const MAX_NORMAL_INDEX: u32 = HARDENED_OFFSET - 1;

/// Canonical path string of the master node.
pub const MASTER_PATH: &str = "m";

/// Length of a raw secp256k1 private key.
pub const SECRET_KEY_LEN: usize = 32;

/// Length of an EVM address in bytes.
pub const EVM_ADDRESS_LEN: usize = 20;

/// Default number of leaf addresses exported per scheme.
pub const DEFAULT_ACCOUNTS: u32 = 1;

/// Default wallet name used for file and vault item titles.
pub const DEFAULT_NAME: &str = "Generated Wallet";

/// SLIP-44 coin types used by the supported schemes (unhardened values).
pub mod coin {
    pub const BITCOIN: u32 = 0;
    pub const TESTNET: u32 = 1;
    pub const ETHEREUM: u32 = 60;
}
