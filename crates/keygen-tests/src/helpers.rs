//! Shared fixtures for the integration tests.

use bitcoin::Network;
use keygen_core::AddressScheme;
use keygen_wallet::{ExportRequest, KeyManager};

/// The all-`abandon` BIP-39 test phrase used by the BIP-44/49/84/86 vectors.
pub const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// BIP-39 seed of [`ABANDON`] with an empty passphrase.
pub const ABANDON_SEED: &str = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4";

/// Master extended key of [`ABANDON_SEED`].
pub const ABANDON_XPRV: &str = "xprv9s21ZrQH143K3GJpoapnV8SFfukcVBSfeCficPSGfubmSFDxo1kuHnLisriDvSnRRuL2Qrg5ggqHKNVpxR86QEC8w35uxmGoggxtQTPvfUu";

/// Mainnet manager over [`ABANDON`] with no passphrase.
pub fn abandon_manager() -> KeyManager {
    KeyManager::new(ABANDON, "").expect("test phrase is valid")
}

/// Request for `accounts` leaves of the given schemes.
pub fn request(accounts: u32, schemes: &[AddressScheme], network: Network) -> ExportRequest {
    ExportRequest {
        accounts,
        schemes: schemes.to_vec(),
        network,
        ..Default::default()
    }
}
