//! Run configuration and its validation.

use std::fmt;
use std::path::PathBuf;

use bitcoin::Network;
use keygen_core::constants::{DEFAULT_ACCOUNTS, DEFAULT_NAME};
use keygen_core::{AddressScheme, KeyError};

use crate::export::ExportRequest;

/// Directory under the home directory that receives exports by default.
pub const OUTPUT_DIR_NAME: &str = ".key-gen";

/// Connect server used when `OP_CONNECT_HOST` is unset.
pub const DEFAULT_CONNECT_HOST: &str = "http://localhost:8080";

pub const ENV_CONNECT_HOST: &str = "OP_CONNECT_HOST";
pub const ENV_SERVICE_TOKEN: &str = "OP_SERVICE_ACCOUNT_TOKEN";
pub const ENV_VAULT_ID: &str = "OP_VAULT_ID";

/// Where and how to reach the password vault.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub host: String,
    pub token: String,
    pub vault_id: String,
}

impl VaultConfig {
    /// Resolve vault settings from explicit values, falling back to
    /// `lookup` for anything not given.
    ///
    /// Returns `None` when neither a token nor a vault id is available.
    /// Having only one of the two is a configuration error.
    pub fn from_lookup<F>(
        token: Option<String>,
        vault_id: Option<String>,
        lookup: F,
    ) -> Result<Option<Self>, KeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let token = non_empty(token).or_else(|| non_empty(lookup(ENV_SERVICE_TOKEN)));
        let vault_id = non_empty(vault_id).or_else(|| non_empty(lookup(ENV_VAULT_ID)));

        match (token, vault_id) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(KeyError::Configuration(format!(
                "a vault id is required when a service token is given; set {ENV_VAULT_ID} or pass --op-vault-id"
            ))),
            (None, Some(_)) => Err(KeyError::Configuration(format!(
                "a service token is required when a vault id is given; set {ENV_SERVICE_TOKEN} or pass --op-service-account-token"
            ))),
            (Some(token), Some(vault_id)) => Ok(Some(Self {
                host: non_empty(lookup(ENV_CONNECT_HOST))
                    .unwrap_or_else(|| DEFAULT_CONNECT_HOST.to_string()),
                token,
                vault_id,
            })),
        }
    }

    /// [`VaultConfig::from_lookup`] over the process environment.
    pub fn from_env(
        token: Option<String>,
        vault_id: Option<String>,
    ) -> Result<Option<Self>, KeyError> {
        Self::from_lookup(token, vault_id, |key| std::env::var(key).ok())
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .field("vault_id", &self.vault_id)
            .finish()
    }
}

/// Everything one `keygen` invocation needs.
#[derive(Clone)]
pub struct KeygenConfig {
    /// Wallet name, used in file names and vault item titles.
    pub name: String,
    pub accounts: u32,
    pub compressed: bool,
    pub save: bool,
    pub encrypt: bool,
    pub decrypt: bool,
    /// Reuse the password as the BIP-39 passphrase.
    pub encrypt_mnemonic: bool,
    pub password: Option<String>,
    /// Output directory when saving, sealed file when decrypting.
    pub file: Option<PathBuf>,
    pub suppress_output: bool,
    pub network: Network,
    pub schemes: Vec<AddressScheme>,
    pub account: u32,
    pub change: u32,
    pub include_mnemonic: bool,
    pub vault: Option<VaultConfig>,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            accounts: DEFAULT_ACCOUNTS,
            compressed: true,
            save: true,
            encrypt: false,
            decrypt: false,
            encrypt_mnemonic: false,
            password: None,
            file: None,
            suppress_output: false,
            network: Network::Bitcoin,
            schemes: AddressScheme::ALL.to_vec(),
            account: 0,
            change: 0,
            include_mnemonic: true,
            vault: None,
        }
    }
}

impl KeygenConfig {
    /// Reject combinations that cannot be carried out.
    pub fn validate(&self) -> Result<(), KeyError> {
        if (self.encrypt || self.decrypt) && self.password().is_none() {
            return Err(KeyError::Configuration(
                "a password is required for encryption and decryption".into(),
            ));
        }
        if self.encrypt_mnemonic && self.password().is_none() {
            return Err(KeyError::Configuration(
                "a password is required to protect the mnemonic".into(),
            ));
        }
        if self.decrypt && self.file.is_none() {
            return Err(KeyError::Configuration(
                "a file path is required for decryption".into(),
            ));
        }
        if !self.save && self.suppress_output {
            return Err(KeyError::Configuration(
                "output cannot be suppressed when the export is not saved".into(),
            ));
        }
        if self.schemes.is_empty() {
            return Err(KeyError::Configuration(
                "at least one address scheme is required".into(),
            ));
        }
        Ok(())
    }

    /// The password, if one was given and is not empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// BIP-39 passphrase: the password when `encrypt_mnemonic` is set,
    /// otherwise empty.
    pub fn mnemonic_passphrase(&self) -> &str {
        match (self.encrypt_mnemonic, self.password()) {
            (true, Some(p)) => p,
            _ => "",
        }
    }

    /// Directory that receives file exports.
    pub fn output_dir(&self) -> Result<PathBuf, KeyError> {
        if let Some(dir) = &self.file {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(OUTPUT_DIR_NAME))
            .ok_or_else(|| KeyError::Configuration("cannot determine home directory".into()))
    }

    pub fn export_request(&self) -> ExportRequest {
        ExportRequest {
            accounts: self.accounts,
            compressed: self.compressed,
            schemes: self.schemes.clone(),
            account: self.account,
            change: self.change,
            include_mnemonic: self.include_mnemonic,
            network: self.network,
        }
    }
}

impl fmt::Debug for KeygenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeygenConfig")
            .field("name", &self.name)
            .field("accounts", &self.accounts)
            .field("compressed", &self.compressed)
            .field("save", &self.save)
            .field("encrypt", &self.encrypt)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("file", &self.file)
            .field("network", &self.network)
            .field("schemes", &self.schemes)
            .field("vault", &self.vault)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let cfg = KeygenConfig::default();
        assert_eq!(cfg.name, "Generated Wallet");
        assert_eq!(cfg.accounts, 1);
        assert!(cfg.compressed);
        assert!(cfg.save);
        assert!(!cfg.encrypt);
        assert_eq!(cfg.schemes.len(), 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn encrypt_requires_password() {
        let cfg = KeygenConfig {
            encrypt: true,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(KeyError::Configuration(_))));

        let cfg = KeygenConfig {
            encrypt: true,
            password: Some(String::new()),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = KeygenConfig {
            encrypt: true,
            password: Some("pw".into()),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn decrypt_requires_file() {
        let cfg = KeygenConfig {
            decrypt: true,
            password: Some("pw".into()),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("file path"), "{err}");
    }

    #[test]
    fn no_save_with_suppressed_output_rejected() {
        let cfg = KeygenConfig {
            save: false,
            suppress_output: true,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_schemes_rejected() {
        let cfg = KeygenConfig {
            schemes: Vec::new(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn mnemonic_passphrase_follows_flag() {
        let mut cfg = KeygenConfig {
            password: Some("pw".into()),
            ..Default::default()
        };
        assert_eq!(cfg.mnemonic_passphrase(), "");
        cfg.encrypt_mnemonic = true;
        assert_eq!(cfg.mnemonic_passphrase(), "pw");
    }

    #[test]
    fn output_dir_prefers_file() {
        let cfg = KeygenConfig {
            file: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };
        assert_eq!(cfg.output_dir().unwrap(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn export_request_mirrors_config() {
        let cfg = KeygenConfig {
            accounts: 4,
            compressed: false,
            network: Network::Testnet,
            ..Default::default()
        };
        let req = cfg.export_request();
        assert_eq!(req.accounts, 4);
        assert!(!req.compressed);
        assert_eq!(req.network, Network::Testnet);
    }

    #[test]
    fn vault_absent() {
        assert_eq!(VaultConfig::from_lookup(None, None, env(&[])).unwrap(), None);
    }

    #[test]
    fn vault_from_environment() {
        let vault = VaultConfig::from_lookup(
            None,
            None,
            env(&[
                (ENV_SERVICE_TOKEN, "tok"),
                (ENV_VAULT_ID, "vault-1"),
                (ENV_CONNECT_HOST, "https://op.internal"),
            ]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(vault.token, "tok");
        assert_eq!(vault.vault_id, "vault-1");
        assert_eq!(vault.host, "https://op.internal");
    }

    #[test]
    fn vault_flags_override_environment() {
        let vault = VaultConfig::from_lookup(
            Some("flag-tok".into()),
            Some("flag-vault".into()),
            env(&[(ENV_SERVICE_TOKEN, "tok"), (ENV_VAULT_ID, "vault-1")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(vault.token, "flag-tok");
        assert_eq!(vault.vault_id, "flag-vault");
        assert_eq!(vault.host, DEFAULT_CONNECT_HOST);
    }

    #[test]
    fn vault_token_without_id_rejected() {
        let err = VaultConfig::from_lookup(Some("tok".into()), None, env(&[])).unwrap_err();
        assert!(err.to_string().contains(ENV_VAULT_ID), "{err}");

        let err =
            VaultConfig::from_lookup(None, None, env(&[(ENV_VAULT_ID, "v")])).unwrap_err();
        assert!(err.to_string().contains(ENV_SERVICE_TOKEN), "{err}");
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = KeygenConfig {
            password: Some("hunter2".into()),
            vault: Some(VaultConfig {
                host: DEFAULT_CONNECT_HOST.into(),
                token: "tok-secret".into(),
                vault_id: "v".into(),
            }),
            ..Default::default()
        };
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-secret"));
    }
}
