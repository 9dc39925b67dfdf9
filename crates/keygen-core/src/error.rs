//! Error types for key derivation and encoding.
use thiserror::Error;

/// Failures raised while building paths, deriving keys or encoding them.
///
/// Every variant is recoverable from the caller's side; nothing in the
/// library retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Invalid or ambiguous path parameters, or an invalid run configuration.
    #[error("configuration: {0}")]
    Configuration(String),

    /// The BIP-32 primitive rejected a seed or child index.
    #[error("derivation: {0}")]
    Derivation(String),

    /// Malformed key material reached the address encoder.
    #[error("encoding: {0}")]
    Encoding(String),

    /// Integrity check of a sealed blob failed.
    #[error("authentication failed")]
    Authentication,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_configuration() {
        let e = KeyError::Configuration("index 2147483648 is hardened".into());
        assert_eq!(e.to_string(), "configuration: index 2147483648 is hardened");
    }

    #[test]
    fn display_authentication_carries_no_detail() {
        assert_eq!(KeyError::Authentication.to_string(), "authentication failed");
    }

    #[test]
    fn clone_and_eq() {
        let e1 = KeyError::Encoding("bad length".into());
        assert_eq!(e1.clone(), e1);
        assert_ne!(e1, KeyError::Derivation("bad length".into()));
    }
}
