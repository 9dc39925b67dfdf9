//! Export records, the structured document and the human-readable tables.
//!
//! Ordering is fixed by [`AddressScheme`] declaration order, then by
//! ascending address index. Each chain-family group and the flat record
//! list start with the master key.

use std::fmt;

use bitcoin::Network;
use keygen_core::address::secret_key;
use keygen_core::constants::DEFAULT_ACCOUNTS;
use keygen_core::{AddressEncoder, AddressScheme, Bip44Path, ChainFamily, EncodingKind};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::keys::DerivedKey;
use crate::manager::KeyManager;

/// Width of the path column.
const PATH_WIDTH: usize = 18;

/// Width of the top rule.
const RULE_WIDTH: usize = 200;

/// Width of the WIF column.
const WIF_WIDTH: usize = 52;

/// Width of the hex private key column.
const HEX_KEY_WIDTH: usize = 64;

/// What to export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRequest {
    /// Number of leaf addresses per scheme.
    pub accounts: u32,
    /// Compressed public keys for legacy addresses and WIF.
    pub compressed: bool,
    /// Requested schemes; order and duplicates are ignored.
    pub schemes: Vec<AddressScheme>,
    /// Account level (hardened) under which leaves are enumerated.
    pub account: u32,
    /// Change level under which leaves are enumerated.
    pub change: u32,
    /// Carry the recovery phrase and passphrase in the output.
    pub include_mnemonic: bool,
    pub network: Network,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            compressed: true,
            schemes: AddressScheme::ALL.to_vec(),
            account: 0,
            change: 0,
            include_mnemonic: true,
            network: Network::Bitcoin,
        }
    }
}

impl ExportRequest {
    /// Requested schemes in export order, without duplicates.
    pub fn ordered_schemes(&self) -> Vec<AddressScheme> {
        let mut schemes = self.schemes.clone();
        schemes.sort();
        schemes.dedup();
        schemes
    }
}

/// One exported key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub path: String,
    pub address: String,
    /// WIF for Bitcoin records, lowercase hex for EVM records.
    pub private_key: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl fmt::Debug for ExportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportRecord")
            .field("path", &self.path)
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .field("kind", &self.kind)
            .finish()
    }
}

/// The structured export.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic_password: Option<String>,
    /// BIP-39 seed, hex.
    pub seed: String,
    /// Master node, base58 extended key.
    pub root_key: String,
    pub evm_accounts: Vec<ExportRecord>,
    pub bitcoin_accounts: Vec<ExportRecord>,
}

impl ExportDocument {
    /// Parse a document previously written by [`ExportFormatter::to_json`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, WalletError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Records of one chain family.
    pub fn accounts(&self, family: ChainFamily) -> &[ExportRecord] {
        match family {
            ChainFamily::Bitcoin => &self.bitcoin_accounts,
            ChainFamily::Evm => &self.evm_accounts,
        }
    }
}

impl fmt::Debug for ExportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportDocument")
            .field("recovery_phrase", &self.recovery_phrase.as_ref().map(|_| "[REDACTED]"))
            .field("seed", &"[REDACTED]")
            .field("evm_accounts", &self.evm_accounts.len())
            .field("bitcoin_accounts", &self.bitcoin_accounts.len())
            .finish()
    }
}

/// Turns a [`KeyManager`] and an [`ExportRequest`] into export records.
pub struct ExportFormatter<'a> {
    manager: &'a KeyManager,
    request: ExportRequest,
    encoder: AddressEncoder,
}

impl<'a> ExportFormatter<'a> {
    pub fn new(manager: &'a KeyManager, request: ExportRequest) -> Self {
        let encoder = AddressEncoder::new(request.network);
        Self {
            manager,
            request,
            encoder,
        }
    }

    pub fn request(&self) -> &ExportRequest {
        &self.request
    }

    /// Every record in export order: the master key, then one group per
    /// requested scheme.
    pub fn records(&self) -> Result<Vec<ExportRecord>, WalletError> {
        let schemes = self.request.ordered_schemes();
        let Some(first) = schemes.first() else {
            return Ok(Vec::new());
        };
        let mut records = vec![self.master_record(first.kind())?];
        for scheme in schemes {
            records.extend(self.scheme_records(scheme)?);
        }
        Ok(records)
    }

    /// Records of one chain family, master first. Empty when no scheme of
    /// the family was requested.
    pub fn family_records(&self, family: ChainFamily) -> Result<Vec<ExportRecord>, WalletError> {
        let schemes: Vec<_> = self
            .request
            .ordered_schemes()
            .into_iter()
            .filter(|s| s.family() == family)
            .collect();
        let Some(first) = schemes.first() else {
            return Ok(Vec::new());
        };
        let mut records = vec![self.master_record(first.kind())?];
        for scheme in schemes {
            records.extend(self.scheme_records(scheme)?);
        }
        Ok(records)
    }

    /// Leaf records of one scheme, ascending by index.
    pub fn scheme_records(&self, scheme: AddressScheme) -> Result<Vec<ExportRecord>, WalletError> {
        (0..self.request.accounts)
            .map(|index| {
                let path = Bip44Path::new(
                    scheme.purpose(),
                    scheme.coin_type(self.request.network),
                    self.request.account,
                    self.request.change,
                    index,
                )?;
                let key = self.manager.derive(&path)?;
                self.record(&key, scheme.kind())
            })
            .collect()
    }

    pub fn document(&self) -> Result<ExportDocument, WalletError> {
        let (recovery_phrase, mnemonic_password) = if self.request.include_mnemonic {
            let passphrase = self.manager.passphrase();
            (
                Some(self.manager.mnemonic().to_string()),
                (!passphrase.is_empty()).then(|| passphrase.to_string()),
            )
        } else {
            (None, None)
        };
        Ok(ExportDocument {
            recovery_phrase,
            mnemonic_password,
            seed: self.manager.seed().to_hex(),
            root_key: self.manager.root_key()?,
            evm_accounts: self.family_records(ChainFamily::Evm)?,
            bitcoin_accounts: self.family_records(ChainFamily::Bitcoin)?,
        })
    }

    /// Compact JSON of [`ExportFormatter::document`].
    pub fn to_json(&self) -> Result<String, WalletError> {
        self.document()?.to_json()
    }

    /// Fixed-width tables, one per requested scheme.
    pub fn render_pretty(&self) -> Result<String, WalletError> {
        let mut out = String::new();
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        if self.request.include_mnemonic {
            let passphrase = match self.manager.passphrase() {
                "" => "<none>",
                p => p,
            };
            push_row(&mut out, "BIP39 Mnemonic:", self.manager.mnemonic());
            push_row(&mut out, "BIP39 Passphrase:", passphrase);
        }
        push_row(&mut out, "BIP39 Seed:", &self.manager.seed().to_hex());
        push_row(&mut out, "BIP32 Root Key:", &self.manager.root_key()?);

        for scheme in self.request.ordered_schemes() {
            let width = scheme.column_width();
            let (key_header, key_width) = match scheme.family() {
                ChainFamily::Bitcoin => ("WIF(Wallet Import Format)", WIF_WIDTH),
                ChainFamily::Evm => ("Private Key(hex)", HEX_KEY_WIDTH),
            };
            let path_header = format!("Path(BIP{})", scheme.purpose().index());
            out.push_str(&format!(
                "\n{path_header:<PATH_WIDTH$} {:<width$} {key_header}\n",
                scheme.kind().label(self.request.compressed),
            ));
            out.push_str(&"-".repeat(PATH_WIDTH + 1 + width + 1 + key_width));
            out.push('\n');

            if matches!(scheme, AddressScheme::Bip44Legacy | AddressScheme::Bip44Evm) {
                push_record(&mut out, &self.master_record(scheme.kind())?, width);
            }
            for record in self.scheme_records(scheme)? {
                push_record(&mut out, &record, width);
            }
        }
        out.push('\n');
        Ok(out)
    }

    fn master_record(&self, kind: EncodingKind) -> Result<ExportRecord, WalletError> {
        let master = self.manager.master()?;
        self.record(&master, kind)
    }

    fn record(&self, key: &DerivedKey, kind: EncodingKind) -> Result<ExportRecord, WalletError> {
        let sk = secret_key(key.secret_bytes())?;
        let compressed = self.request.compressed;
        let enc = &self.encoder;
        let (address, private_key) = match kind {
            EncodingKind::Legacy => (enc.legacy_address(&sk, compressed), enc.wif(&sk, compressed)),
            EncodingKind::NestedSegwit => (enc.nested_segwit_address(&sk)?, enc.wif(&sk, compressed)),
            EncodingKind::NativeSegwit => (enc.native_segwit_address(&sk), enc.wif(&sk, compressed)),
            EncodingKind::Taproot => (enc.taproot_address(&sk), enc.wif(&sk, compressed)),
            EncodingKind::Evm => (enc.evm_address(&sk), key.hex_key()),
        };
        Ok(ExportRecord {
            path: key.path().to_string(),
            address,
            private_key,
            kind: kind.label(compressed).to_string(),
        })
    }
}

fn push_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("{label:<PATH_WIDTH$} {value}\n"));
}

fn push_record(out: &mut String, record: &ExportRecord, width: usize) {
    out.push_str(&format!(
        "{:<PATH_WIDTH$} {:<width$} {}\n",
        record.path, record.address, record.private_key
    ));
}
