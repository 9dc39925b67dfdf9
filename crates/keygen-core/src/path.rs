//! BIP-44 path model.
//!
//! A full path has five levels:
//!
//! ```text
//! m / purpose' / coin_type' / account' / change / address_index
//! ```
//!
//! The first three levels are hardened (the primitive receives the index
//! with [`HARDENED_OFFSET`] OR-ed in); the last two are not. Values are kept
//! unbiased internally and the bias is applied only when a [`ChildIndex`] is
//! handed to the primitive, so the canonical string never shows it.

use std::fmt;
use std::str::FromStr;

use bitcoin::bip32::ChildNumber;
use serde::{Deserialize, Serialize};

use crate::constants::{HARDENED_OFFSET, MASTER_PATH, coin};
use crate::error::KeyError;

/// One step of a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildIndex {
    /// Unhardened child; value is below 2^31.
    Normal(u32),
    /// Hardened child; value is the unbiased index.
    Hardened(u32),
}

impl ChildIndex {
    /// Build a hardened index.
    ///
    /// Accepts the index with or without the hardened bias already applied,
    /// since OR-ing the bias is idempotent. Values that do not fit in 32 bits
    /// are rejected.
    pub fn hardened(index: u64) -> Result<Self, KeyError> {
        let raw = fit_u32(index)?;
        Ok(ChildIndex::Hardened(raw & !HARDENED_OFFSET))
    }

    /// Build an unhardened index.
    ///
    /// An index that already carries the hardened bias is rejected rather
    /// than silently reinterpreted.
    pub fn normal(index: u64) -> Result<Self, KeyError> {
        let raw = fit_u32(index)?;
        if raw & HARDENED_OFFSET != 0 {
            return Err(KeyError::Configuration(format!(
                "index {raw} carries the hardened bias where an unhardened index is expected"
            )));
        }
        Ok(ChildIndex::Normal(raw))
    }

    /// The unbiased index, as shown in a canonical path.
    pub fn index(self) -> u32 {
        match self {
            ChildIndex::Normal(i) | ChildIndex::Hardened(i) => i,
        }
    }

    /// The value passed to the derivation primitive.
    pub fn raw(self) -> u32 {
        match self {
            ChildIndex::Normal(i) => i,
            ChildIndex::Hardened(i) => i | HARDENED_OFFSET,
        }
    }

    pub fn is_hardened(self) -> bool {
        matches!(self, ChildIndex::Hardened(_))
    }

    /// Convert into the BIP-32 crate's child number.
    pub fn child_number(self) -> ChildNumber {
        ChildNumber::from(self.raw())
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildIndex::Normal(i) => write!(f, "{i}"),
            ChildIndex::Hardened(i) => write!(f, "{i}'"),
        }
    }
}

fn fit_u32(index: u64) -> Result<u32, KeyError> {
    u32::try_from(index).map_err(|_| {
        KeyError::Configuration(format!("index {index} does not fit in 32 bits"))
    })
}

/// BIP-43 purpose level (always hardened).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Purpose(u32);

impl Purpose {
    /// Legacy P2PKH and EVM accounts.
    pub const BIP44: Purpose = Purpose(44);
    /// P2WPKH nested in P2SH.
    pub const BIP49: Purpose = Purpose(49);
    /// Native P2WPKH.
    pub const BIP84: Purpose = Purpose(84);
    /// Key-path-only P2TR.
    pub const BIP86: Purpose = Purpose(86);

    /// Build a purpose from an index with or without the hardened bias.
    pub fn new(index: u32) -> Self {
        Purpose(index & !HARDENED_OFFSET)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn child(self) -> ChildIndex {
        ChildIndex::Hardened(self.0)
    }
}

/// SLIP-44 coin type level (always hardened).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoinType(u32);

impl CoinType {
    pub const BITCOIN: CoinType = CoinType(coin::BITCOIN);
    pub const TESTNET: CoinType = CoinType(coin::TESTNET);
    pub const ETHEREUM: CoinType = CoinType(coin::ETHEREUM);

    /// Build a coin type from an index with or without the hardened bias.
    pub fn new(index: u32) -> Self {
        CoinType(index & !HARDENED_OFFSET)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn child(self) -> ChildIndex {
        ChildIndex::Hardened(self.0)
    }
}

/// A complete five-level BIP-44 path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bip44Path {
    purpose: Purpose,
    coin_type: CoinType,
    account: ChildIndex,
    change: ChildIndex,
    index: ChildIndex,
}

impl Bip44Path {
    /// Number of levels below the master node.
    pub const DEPTH: usize = 5;

    /// Validate and build a path.
    ///
    /// `account` may carry the hardened bias; `change` and `index` may not.
    pub fn new(
        purpose: Purpose,
        coin_type: CoinType,
        account: u32,
        change: u32,
        index: u32,
    ) -> Result<Self, KeyError> {
        Ok(Self {
            purpose,
            coin_type,
            account: ChildIndex::hardened(account.into())?,
            change: ChildIndex::normal(change.into())?,
            index: ChildIndex::normal(index.into())?,
        })
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn coin_type(&self) -> CoinType {
        self.coin_type
    }

    pub fn account(&self) -> u32 {
        self.account.index()
    }

    pub fn change(&self) -> u32 {
        self.change.index()
    }

    pub fn index(&self) -> u32 {
        self.index.index()
    }

    /// The five child indices, root to leaf.
    pub fn components(&self) -> [ChildIndex; Self::DEPTH] {
        [
            self.purpose.child(),
            self.coin_type.child(),
            self.account,
            self.change,
            self.index,
        ]
    }

    /// Canonical string of the ancestor at `depth` (0 is the master node).
    pub fn prefix(&self, depth: usize) -> String {
        canonical(&self.components()[..depth.min(Self::DEPTH)])
    }
}

impl fmt::Display for Bip44Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix(Self::DEPTH))
    }
}

impl FromStr for Bip44Path {
    type Err = KeyError;

    /// Parse `m/44'/0'/0'/0/0`. Both `'` and `h` mark hardened levels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some(MASTER_PATH) {
            return Err(KeyError::Configuration(format!("path must start with 'm': {s}")));
        }
        let parts: Vec<&str> = parts.collect();
        if parts.len() != Self::DEPTH {
            return Err(KeyError::Configuration(format!(
                "expected {} levels, got {}: {s}",
                Self::DEPTH,
                parts.len()
            )));
        }

        let mut levels = Vec::with_capacity(Self::DEPTH);
        for (depth, part) in parts.iter().enumerate() {
            let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                Some(d) => (d, true),
                None => (*part, false),
            };
            let value: u64 = digits
                .parse()
                .map_err(|_| KeyError::Configuration(format!("invalid index '{part}' in {s}")))?;
            let must_harden = depth < 3;
            if hardened != must_harden {
                return Err(KeyError::Configuration(format!(
                    "level {} of {s} must be {}",
                    depth + 1,
                    if must_harden { "hardened" } else { "unhardened" }
                )));
            }
            levels.push(if hardened {
                ChildIndex::hardened(value)?
            } else {
                ChildIndex::normal(value)?
            });
        }

        Ok(Self {
            purpose: Purpose(levels[0].index()),
            coin_type: CoinType(levels[1].index()),
            account: levels[2],
            change: levels[3],
            index: levels[4],
        })
    }
}

/// Render child indices as a canonical `m/...` string.
pub fn canonical(components: &[ChildIndex]) -> String {
    let mut out = String::from(MASTER_PATH);
    for c in components {
        out.push('/');
        out.push_str(&c.to_string());
    }
    out
}
