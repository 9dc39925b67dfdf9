//! AES-256-GCM sealing of export payloads.
//!
//! The symmetric key is PBKDF2-HMAC-SHA256 over the password with a fixed
//! all-zero salt. Every password therefore maps to one key across all
//! files, which leaves sealed exports open to precomputed dictionary
//! attacks. The scheme is kept so that files written by earlier releases
//! still open.
//!
//! # Wire format
//! ```text
//! nonce (12 bytes) || ciphertext + auth_tag (16 bytes)
//! ```

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use keygen_core::KeyError;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// PBKDF2 iteration count.
pub const KDF_ROUNDS: u32 = 4096;

/// Salt length in bytes. The salt itself is all zeros.
const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum sealed size (nonce + auth tag).
const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// A sealed payload: `nonce || ciphertext_with_tag`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    /// Wrap bytes read back from storage.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, WalletError> {
        if bytes.len() < MIN_SEALED_LEN {
            return Err(WalletError::CorruptedBlob(format!(
                "sealed data too short: {} < {MIN_SEALED_LEN}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_LEN]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.0[NONCE_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derive the 256-bit cipher key for `password`.
///
/// The salt is fixed; see the module documentation.
pub fn derive_key(password: &[u8]) -> Zeroizing<[u8; 32]> {
    let salt = [0u8; SALT_LEN];
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, &salt, KDF_ROUNDS, key.as_mut());
    key
}

/// Seal `plaintext` under `password` with a fresh random nonce.
pub fn seal(plaintext: &[u8], password: &[u8]) -> Result<EncryptedBlob, WalletError> {
    use rand::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password);
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| WalletError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(EncryptedBlob(sealed))
}

/// Open a blob produced by [`seal`].
///
/// A wrong password and a tampered blob both surface as
/// [`KeyError::Authentication`]; the two cases are not distinguished.
pub fn open(blob: &EncryptedBlob, password: &[u8]) -> Result<Vec<u8>, WalletError> {
    let key = derive_key(password);
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| WalletError::Encryption(e.to_string()))?;
    let nonce = Nonce::from_slice(blob.nonce());

    cipher
        .decrypt(nonce, blob.ciphertext())
        .map_err(|_| KeyError::Authentication.into())
}

/// Read a sealed file from disk and open it.
pub fn open_file(path: &Path, password: &[u8]) -> Result<Vec<u8>, WalletError> {
    let bytes = std::fs::read(path)?;
    let blob = EncryptedBlob::from_bytes(bytes)?;
    open(&blob, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_failed() -> WalletError {
        WalletError::Key(KeyError::Authentication)
    }

    #[test]
    fn seal_open_roundtrip() {
        let password = b"correct horse battery staple";
        let plaintext = b"{\"seed\":\"00\"}";

        let blob = seal(plaintext, password).unwrap();
        assert_eq!(open(&blob, password).unwrap(), plaintext);
    }

    #[test]
    fn seal_open_empty_data() {
        let blob = seal(b"", b"password").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + TAG_LEN);
        assert_eq!(open(&blob, b"password").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn seal_open_large_data() {
        let plaintext = vec![0xABu8; 10_000];
        let blob = seal(&plaintext, b"password").unwrap();
        assert_eq!(open(&blob, b"password").unwrap(), plaintext);
    }

    #[test]
    fn layout_is_nonce_then_ciphertext() {
        let blob = seal(b"secret", b"pw").unwrap();
        assert_eq!(blob.nonce().len(), NONCE_LEN);
        assert_eq!(blob.ciphertext().len(), b"secret".len() + TAG_LEN);
        assert_eq!(blob.as_bytes()[..NONCE_LEN], *blob.nonce());
    }

    #[test]
    fn nonces_are_fresh() {
        let a = seal(b"same", b"pw").unwrap();
        let b = seal(b"same", b"pw").unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_fails() {
        let blob = seal(b"secret", b"correct").unwrap();
        assert_eq!(open(&blob, b"wrong").unwrap_err(), auth_failed());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let blob = seal(b"secret data", b"password").unwrap();
        let mut bytes = blob.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let blob = EncryptedBlob::from_bytes(bytes).unwrap();
        assert_eq!(open(&blob, b"password").unwrap_err(), auth_failed());
    }

    #[test]
    fn tampered_nonce_fails() {
        let blob = seal(b"secret", b"password").unwrap();
        let mut bytes = blob.into_bytes();
        bytes[0] ^= 0xFF;
        let blob = EncryptedBlob::from_bytes(bytes).unwrap();
        assert_eq!(open(&blob, b"password").unwrap_err(), auth_failed());
    }

    #[test]
    fn truncated_data_fails() {
        let err = EncryptedBlob::from_bytes(vec![0u8; 10]).unwrap_err();
        assert!(matches!(err, WalletError::CorruptedBlob(_)));
    }

    #[test]
    fn derive_key_deterministic() {
        assert_eq!(*derive_key(b"password"), *derive_key(b"password"));
        assert_ne!(*derive_key(b"password1"), *derive_key(b"password2"));
    }

    #[test]
    fn open_file_reads_sealed_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.bin");
        let blob = seal(b"on disk", b"pw").unwrap();
        std::fs::write(&path, blob.as_bytes()).unwrap();

        assert_eq!(open_file(&path, b"pw").unwrap(), b"on disk");
        assert_eq!(open_file(&path, b"nope").unwrap_err(), auth_failed());
    }

    #[test]
    fn open_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_file(&dir.path().join("absent.bin"), b"pw").unwrap_err();
        assert!(matches!(err, WalletError::Io(_)));
    }
}
