//! Chain-specific encodings of a single secp256k1 private key.
//!
//! One [`AddressEncoder`] produces every representation the export needs:
//!
//! - EVM: Keccak-256 of the uncompressed public key, low 20 bytes, EIP-55
//!   mixed-case checksum
//! - Legacy: P2PKH over the (optionally compressed) public key
//! - Nested SegWit: P2WPKH witness program wrapped in a P2SH redeem script
//! - Native SegWit: P2WPKH, bech32, witness version 0
//! - Taproot: BIP-86 key-path-only tweak, x-only key, bech32m, witness version 1
//! - WIF: version byte, key bytes, optional compression marker, base58check
//!
//! Witness programs are only defined over compressed keys, so the
//! compression flag affects the legacy address and the WIF string only.

use std::fmt;
use std::str::FromStr;

use bitcoin::key::TapTweak;
use bitcoin::secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use bitcoin::{Address, CompressedPublicKey, Network, PrivateKey, ScriptBuf};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::{EVM_ADDRESS_LEN, SECRET_KEY_LEN};
use crate::error::KeyError;
use crate::path::{CoinType, Purpose};

/// Which encoding an export record carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EncodingKind {
    Legacy,
    NestedSegwit,
    NativeSegwit,
    Taproot,
    Evm,
}

impl EncodingKind {
    /// Display label used for record types and table headers.
    pub fn label(self, compressed: bool) -> &'static str {
        match self {
            EncodingKind::Legacy if compressed => "Legacy(P2PKH, compressed)",
            EncodingKind::Legacy => "Legacy(P2PKH, uncompressed)",
            EncodingKind::NestedSegwit => "SegWit(P2WPKH-nested-in-P2SH)",
            EncodingKind::NativeSegwit => "SegWit(P2WPKH, bech32)",
            EncodingKind::Taproot => "Taproot(P2TR, bech32m)",
            EncodingKind::Evm => "Ethereum(EIP55)",
        }
    }
}

/// Chain family an encoding belongs to; one export group per family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChainFamily {
    Bitcoin,
    Evm,
}

/// A (purpose, coin type, encoding) triple the exporter knows how to emit.
///
/// Declaration order is the export order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressScheme {
    Bip44Legacy,
    Bip49Nested,
    Bip84Native,
    Bip86Taproot,
    Bip44Evm,
}

impl AddressScheme {
    pub const ALL: [AddressScheme; 5] = [
        AddressScheme::Bip44Legacy,
        AddressScheme::Bip49Nested,
        AddressScheme::Bip84Native,
        AddressScheme::Bip86Taproot,
        AddressScheme::Bip44Evm,
    ];

    pub fn purpose(self) -> Purpose {
        match self {
            AddressScheme::Bip44Legacy | AddressScheme::Bip44Evm => Purpose::BIP44,
            AddressScheme::Bip49Nested => Purpose::BIP49,
            AddressScheme::Bip84Native => Purpose::BIP84,
            AddressScheme::Bip86Taproot => Purpose::BIP86,
        }
    }

    /// Coin type for this scheme; Bitcoin schemes move to coin type 1 off mainnet.
    pub fn coin_type(self, network: Network) -> CoinType {
        match (self.family(), network) {
            (ChainFamily::Evm, _) => CoinType::ETHEREUM,
            (ChainFamily::Bitcoin, Network::Bitcoin) => CoinType::BITCOIN,
            (ChainFamily::Bitcoin, _) => CoinType::TESTNET,
        }
    }

    pub fn kind(self) -> EncodingKind {
        match self {
            AddressScheme::Bip44Legacy => EncodingKind::Legacy,
            AddressScheme::Bip49Nested => EncodingKind::NestedSegwit,
            AddressScheme::Bip84Native => EncodingKind::NativeSegwit,
            AddressScheme::Bip86Taproot => EncodingKind::Taproot,
            AddressScheme::Bip44Evm => EncodingKind::Evm,
        }
    }

    pub fn family(self) -> ChainFamily {
        match self {
            AddressScheme::Bip44Evm => ChainFamily::Evm,
            _ => ChainFamily::Bitcoin,
        }
    }

    /// Width of the address column in the human-readable table.
    pub fn column_width(self) -> usize {
        match self.kind() {
            EncodingKind::Legacy | EncodingKind::NestedSegwit => 34,
            EncodingKind::NativeSegwit | EncodingKind::Evm => 42,
            EncodingKind::Taproot => 62,
        }
    }
}

impl fmt::Display for AddressScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AddressScheme::Bip44Legacy => "legacy",
            AddressScheme::Bip49Nested => "nested",
            AddressScheme::Bip84Native => "native",
            AddressScheme::Bip86Taproot => "taproot",
            AddressScheme::Bip44Evm => "evm",
        };
        f.write_str(s)
    }
}

impl FromStr for AddressScheme {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "p2pkh" | "bip44" => Ok(AddressScheme::Bip44Legacy),
            "nested" | "p2sh-p2wpkh" | "bip49" => Ok(AddressScheme::Bip49Nested),
            "native" | "p2wpkh" | "bip84" => Ok(AddressScheme::Bip84Native),
            "taproot" | "p2tr" | "bip86" => Ok(AddressScheme::Bip86Taproot),
            "evm" | "ethereum" => Ok(AddressScheme::Bip44Evm),
            other => Err(KeyError::Configuration(format!("unknown address scheme: {other}"))),
        }
    }
}

/// Every encoding of one private key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressSet {
    pub evm: String,
    pub legacy: String,
    pub nested_segwit: String,
    pub native_segwit: String,
    pub taproot: String,
    pub wif: String,
}

impl AddressSet {
    /// The address for one encoding kind.
    pub fn address(&self, kind: EncodingKind) -> &str {
        match kind {
            EncodingKind::Legacy => &self.legacy,
            EncodingKind::NestedSegwit => &self.nested_segwit,
            EncodingKind::NativeSegwit => &self.native_segwit,
            EncodingKind::Taproot => &self.taproot,
            EncodingKind::Evm => &self.evm,
        }
    }
}

/// Deterministic encoder from raw key bytes to chain-specific strings.
pub struct AddressEncoder {
    secp: Secp256k1<All>,
    network: Network,
}

impl AddressEncoder {
    /// `network` selects Bitcoin version bytes and HRP; EVM output is unaffected.
    pub fn new(network: Network) -> Self {
        Self {
            secp: Secp256k1::new(),
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Compute every encoding for a 32-byte private key.
    pub fn encode(&self, secret: &[u8], compressed: bool) -> Result<AddressSet, KeyError> {
        let sk = secret_key(secret)?;
        Ok(AddressSet {
            evm: self.evm_address(&sk),
            legacy: self.legacy_address(&sk, compressed),
            nested_segwit: self.nested_segwit_address(&sk)?,
            native_segwit: self.native_segwit_address(&sk),
            taproot: self.taproot_address(&sk),
            wif: self.wif(&sk, compressed),
        })
    }

    /// EIP-55 checksummed address of the key.
    pub fn evm_address(&self, sk: &SecretKey) -> String {
        let pk = PublicKey::from_secret_key(&self.secp, sk);
        let uncompressed = pk.serialize_uncompressed();
        // Skip the 0x04 SEC1 tag.
        let digest = Keccak256::digest(&uncompressed[1..]);
        checksum_encode(&digest[digest.len() - EVM_ADDRESS_LEN..])
    }

    /// P2PKH address; the key hash covers the compressed or uncompressed point.
    pub fn legacy_address(&self, sk: &SecretKey, compressed: bool) -> String {
        let pk = self.private_key(sk, compressed).public_key(&self.secp);
        Address::p2pkh(pk.pubkey_hash(), self.network).to_string()
    }

    /// P2SH address whose redeem script is the P2WPKH witness program.
    pub fn nested_segwit_address(&self, sk: &SecretKey) -> Result<String, KeyError> {
        let redeem = ScriptBuf::new_p2wpkh(&self.compressed(sk).wpubkey_hash());
        Address::p2sh(&redeem, self.network)
            .map(|a| a.to_string())
            .map_err(|e| KeyError::Encoding(e.to_string()))
    }

    /// Native P2WPKH address (bech32, witness v0).
    pub fn native_segwit_address(&self, sk: &SecretKey) -> String {
        Address::p2wpkh(&self.compressed(sk), self.network).to_string()
    }

    /// BIP-86 taproot address (bech32m, witness v1), no script tree.
    pub fn taproot_address(&self, sk: &SecretKey) -> String {
        let (internal, _parity) = PublicKey::from_secret_key(&self.secp, sk).x_only_public_key();
        let (output_key, _parity) = internal.tap_tweak(&self.secp, None);
        Address::p2tr_tweaked(output_key, self.network).to_string()
    }

    /// Wallet import format string.
    pub fn wif(&self, sk: &SecretKey, compressed: bool) -> String {
        self.private_key(sk, compressed).to_wif()
    }

    fn private_key(&self, sk: &SecretKey, compressed: bool) -> PrivateKey {
        if compressed {
            PrivateKey::new(*sk, self.network)
        } else {
            PrivateKey::new_uncompressed(*sk, self.network)
        }
    }

    fn compressed(&self, sk: &SecretKey) -> CompressedPublicKey {
        CompressedPublicKey(PublicKey::from_secret_key(&self.secp, sk))
    }
}

impl Default for AddressEncoder {
    fn default() -> Self {
        Self::new(Network::Bitcoin)
    }
}

/// Parse raw key bytes into a secp256k1 scalar.
pub fn secret_key(bytes: &[u8]) -> Result<SecretKey, KeyError> {
    if bytes.len() != SECRET_KEY_LEN {
        return Err(KeyError::Encoding(format!(
            "private key must be {SECRET_KEY_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(bytes).map_err(|e| KeyError::Encoding(e.to_string()))
}

/// Apply the EIP-55 checksum to an address given as hex, with or without `0x`.
pub fn to_checksum_address(address: &str) -> Result<String, KeyError> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let bytes = hex::decode(digits).map_err(|e| KeyError::Encoding(format!("address hex: {e}")))?;
    if bytes.len() != EVM_ADDRESS_LEN {
        return Err(KeyError::Encoding(format!(
            "address must be {EVM_ADDRESS_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(checksum_encode(&bytes))
}

/// EIP-55: uppercase each hex letter whose nibble in Keccak-256(lowercase hex) is >= 8.
fn checksum_encode(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
