//! # keygen-core — path model and address encoding for key-gen.
//!
//! The pieces of key generation that do not depend on a seed:
//!
//! - [`error`] — `KeyError`, the four-kind failure taxonomy
//! - [`constants`] — hardened bias, SLIP-44 coin types, key lengths
//! - [`path`] — `Purpose`, `CoinType`, `ChildIndex`, `Bip44Path`
//! - [`traits`] — `ChildDeriver`, the seam over the BIP-32 primitive
//! - [`address`] — `AddressEncoder`, `AddressSet`, `AddressScheme`

pub mod address;
pub mod constants;
pub mod error;
pub mod path;
pub mod traits;

pub use address::{AddressEncoder, AddressScheme, AddressSet, ChainFamily, EncodingKind};
pub use error::KeyError;
pub use path::{Bip44Path, ChildIndex, CoinType, Purpose};
pub use traits::{Bip32Deriver, ChildDeriver};
