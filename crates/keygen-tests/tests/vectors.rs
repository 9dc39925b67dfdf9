//! Published reference vectors for the all-`abandon` test phrase.
//!
//! Sources: BIP-39 (seed), BIP-32 serialization (root key), and the test
//! vector sections of BIP-49, BIP-84 and BIP-86. The BIP-44 Bitcoin and
//! Ethereum values are the ones reference wallets derive for the same
//! phrase.

use bitcoin::Network;
use keygen_core::{AddressScheme, CoinType, Purpose};
use keygen_tests::helpers::*;
use keygen_wallet::{ExportFormatter, KeyManager};

/// First record of a single-scheme export (index 0 after the master).
fn first_leaf(km: &KeyManager, scheme: AddressScheme, network: Network) -> (String, String, String) {
    let fmt = ExportFormatter::new(km, request(1, &[scheme], network));
    let records = fmt.scheme_records(scheme).unwrap();
    let r = &records[0];
    (r.path.clone(), r.address.clone(), r.private_key.clone())
}

#[test]
fn seed_and_root_key() {
    let km = abandon_manager();
    assert_eq!(km.seed().to_hex(), ABANDON_SEED);
    assert_eq!(km.root_key().unwrap(), ABANDON_XPRV);
}

#[test]
fn bip44_bitcoin_first_address() {
    let km = abandon_manager();
    let (path, address, wif) = first_leaf(&km, AddressScheme::Bip44Legacy, Network::Bitcoin);
    assert_eq!(path, "m/44'/0'/0'/0/0");
    assert_eq!(address, "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
    assert_eq!(wif, "L4p2b9VAf8k5aUahF1JCJUzZkgNEAqLfq8DDdQiyAprQAKSbu8hf");
}

#[test]
fn bip49_testnet_first_address() {
    let km = KeyManager::with_network(ABANDON, "", Network::Testnet).unwrap();
    let (path, address, _) = first_leaf(&km, AddressScheme::Bip49Nested, Network::Testnet);
    assert_eq!(path, "m/49'/1'/0'/0/0");
    assert_eq!(address, "2Mww8dCYPUpKHofjgcXcBCEGmniw9CoaiD2");
}

#[test]
fn bip49_mainnet_first_address() {
    let km = abandon_manager();
    let (path, address, _) = first_leaf(&km, AddressScheme::Bip49Nested, Network::Bitcoin);
    assert_eq!(path, "m/49'/0'/0'/0/0");
    assert_eq!(address, "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf");
}

#[test]
fn bip84_first_address() {
    let km = abandon_manager();
    let (path, address, wif) = first_leaf(&km, AddressScheme::Bip84Native, Network::Bitcoin);
    assert_eq!(path, "m/84'/0'/0'/0/0");
    assert_eq!(address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
    assert_eq!(wif, "KyZpNDKnfs94vbrwhJneDi77V6jF64PWPF8x5cdJb8ifgg2DUc9d");
}

#[test]
fn bip86_first_address() {
    let km = abandon_manager();
    let (path, address, wif) = first_leaf(&km, AddressScheme::Bip86Taproot, Network::Bitcoin);
    assert_eq!(path, "m/86'/0'/0'/0/0");
    assert_eq!(
        address,
        "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr"
    );
    assert_eq!(wif, "KyRv5iFPHG7iB5E4CqvMzH3WFJVhbfYK4VY7XAedd9Ys69mEsPLQ");
}

#[test]
fn bip44_ethereum_first_address() {
    let km = abandon_manager();
    let (path, address, key) = first_leaf(&km, AddressScheme::Bip44Evm, Network::Bitcoin);
    assert_eq!(path, "m/44'/60'/0'/0/0");
    assert_eq!(address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    assert_eq!(
        key,
        "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
    );
}

/// The raw key behind the Ethereum vector, reached through the level
/// accessors rather than the formatter.
#[test]
fn ethereum_key_through_manager() {
    let km = abandon_manager();
    let key = km.key(Purpose::BIP44, CoinType::ETHEREUM, 0, 0, 0).unwrap();
    assert_eq!(
        key.hex_key(),
        "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
    );
}

#[test]
fn vectors_are_stable_across_managers() {
    let a = abandon_manager();
    let b = abandon_manager();
    for scheme in AddressScheme::ALL {
        assert_eq!(
            first_leaf(&a, scheme, Network::Bitcoin),
            first_leaf(&b, scheme, Network::Bitcoin),
            "{scheme}"
        );
    }
}
