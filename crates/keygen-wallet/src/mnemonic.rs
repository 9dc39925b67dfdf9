//! BIP-39 mnemonic generation and validation.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Entropy for freshly generated phrases (256 bits, 24 words).
const GENERATED_ENTROPY_LEN: usize = 32;

/// Generate a fresh 24-word English phrase from OS entropy.
pub fn generate_mnemonic() -> Result<String, WalletError> {
    let mut entropy = Zeroizing::new([0u8; GENERATED_ENTROPY_LEN]);
    rand::rngs::OsRng.fill_bytes(entropy.as_mut());
    let m = Mnemonic::from_entropy_in(Language::English, entropy.as_ref())
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(m.to_string())
}

/// Collapse runs of whitespace and lowercase the phrase.
pub fn normalize_mnemonic(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalize and validate a phrase (word list and checksum).
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, WalletError> {
    Mnemonic::parse_in(Language::English, normalize_mnemonic(phrase))
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_phrase_is_24_valid_words() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24, "{phrase}");
        assert!(parse_mnemonic(&phrase).is_ok());
    }

    #[test]
    fn generated_phrases_differ() {
        assert_ne!(generate_mnemonic().unwrap(), generate_mnemonic().unwrap());
    }

    #[test]
    fn twelve_word_vector_parses() {
        let m = parse_mnemonic(ABANDON).unwrap();
        assert_eq!(m.word_count(), 12);
    }

    /// Extra spaces, tabs and capitals must be normalized away.
    #[test]
    fn whitespace_and_case_normalization() {
        let messy = format!("  {}\t", ABANDON.replace(' ', "   ").to_uppercase());
        assert_eq!(normalize_mnemonic(&messy), ABANDON);
        assert!(parse_mnemonic(&messy).is_ok());
    }

    #[test]
    fn invalid_word_rejected() {
        let err = parse_mnemonic("abandon abandon abandon invalidword").unwrap_err();
        assert!(err.to_string().contains("invalid mnemonic"), "{err}");
    }

    /// Valid words, wrong final word: checksum mismatch.
    #[test]
    fn bad_checksum_rejected() {
        let phrase = format!("{} abandon", vec!["abandon"; 11].join(" "));
        assert!(matches!(parse_mnemonic(&phrase), Err(WalletError::InvalidMnemonic(_))));
    }

    #[test]
    fn wrong_word_count_rejected() {
        assert!(parse_mnemonic("abandon abandon").is_err());
    }
}
