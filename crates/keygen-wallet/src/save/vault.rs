//! 1Password Connect sink.
//!
//! Each export becomes one crypto-wallet item with three sections: the
//! wallet secrets, the EVM accounts and the Bitcoin accounts. Secret
//! values are stored as concealed fields.

use std::time::Duration;

use async_trait::async_trait;
use keygen_core::constants::MASTER_PATH;
use serde::{Deserialize, Serialize};

use super::{ExportPayload, SaveContext, Saver};
use crate::config::VaultConfig;
use crate::error::WalletError;
use crate::export::{ExportDocument, ExportRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SECTION_WALLET: &str = "wallet";
const SECTION_EVM: &str = "evmAccounts";
const SECTION_BITCOIN: &str = "bitcoinAccounts";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRef {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSection {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemField {
    pub id: String,
    pub label: String,
    /// `STRING` or `CONCEALED`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub section: SectionRef,
}

impl std::fmt::Debug for ItemField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value: &str = if self.kind == "CONCEALED" { "[REDACTED]" } else { &self.value };
        f.debug_struct("ItemField")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("value", &value)
            .finish()
    }
}

impl ItemField {
    fn text(id: impl Into<String>, label: impl Into<String>, value: &str, section: &str) -> Self {
        Self::new(id, label, "STRING", value, section)
    }

    fn concealed(
        id: impl Into<String>,
        label: impl Into<String>,
        value: &str,
        section: &str,
    ) -> Self {
        Self::new(id, label, "CONCEALED", value, section)
    }

    fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: &str,
        value: &str,
        section: &str,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: kind.to_string(),
            value: value.to_string(),
            section: SectionRef {
                id: section.to_string(),
            },
        }
    }
}

/// Request body for `POST /v1/vaults/{id}/items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultItem {
    pub vault: VaultRef,
    pub title: String,
    pub category: String,
    pub sections: Vec<ItemSection>,
    pub fields: Vec<ItemField>,
}

impl VaultItem {
    /// Build the item for one export.
    pub fn build(vault_id: &str, ctx: &SaveContext, doc: &ExportDocument) -> Self {
        let sections = [
            (SECTION_WALLET, "Wallet"),
            (SECTION_EVM, "EVM Accounts"),
            (SECTION_BITCOIN, "Bitcoin Accounts"),
        ]
        .into_iter()
        .map(|(id, label)| ItemSection {
            id: id.to_string(),
            label: label.to_string(),
        })
        .collect();

        let mut fields = Vec::new();
        if let Some(phrase) = &doc.recovery_phrase {
            fields.push(ItemField::concealed("recoveryPhrase", "recovery phrase", phrase, SECTION_WALLET));
        }
        if let Some(password) = &doc.mnemonic_password {
            fields.push(ItemField::concealed("password", "mnemonic password", password, SECTION_WALLET));
        }
        fields.push(ItemField::concealed("seed", "seed", &doc.seed, SECTION_WALLET));
        fields.push(ItemField::concealed("rootKey", "root key", &doc.root_key, SECTION_WALLET));

        push_accounts(&mut fields, "EVM", &doc.evm_accounts, SECTION_EVM);
        push_accounts(&mut fields, "BTC", &doc.bitcoin_accounts, SECTION_BITCOIN);

        Self {
            vault: VaultRef {
                id: vault_id.to_string(),
            },
            title: ctx.title(),
            category: "CRYPTO_WALLET".to_string(),
            sections,
            fields,
        }
    }
}

/// Address, path and private key per leaf record; the master record is
/// already covered by the root key.
fn push_accounts(fields: &mut Vec<ItemField>, prefix: &str, records: &[ExportRecord], section: &str) {
    let leaves = records.iter().filter(|r| r.path != MASTER_PATH);
    for (i, record) in leaves.enumerate() {
        let n = i + 1;
        fields.push(ItemField::text(
            format!("walletAddress{prefix}{i}"),
            format!("{} #{n}", record.kind),
            &record.address,
            section,
        ));
        fields.push(ItemField::text(
            format!("walletPath{prefix}{i}"),
            format!("Path #{n}"),
            &record.path,
            section,
        ));
        fields.push(ItemField::concealed(
            format!("walletPrivateKey{prefix}{i}"),
            format!("Private Key #{n}"),
            &record.private_key,
            section,
        ));
    }
}

#[derive(Debug, Deserialize)]
struct CreatedItem {
    id: String,
}

/// Posts exports to a 1Password Connect server.
pub struct VaultSaver {
    config: VaultConfig,
    client: reqwest::Client,
}

impl VaultSaver {
    pub fn new(config: VaultConfig) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Save {
                sink: "vault",
                reason: format!("http client: {e}"),
            })?;
        Ok(Self { config, client })
    }

    /// Items endpoint for the configured vault.
    pub fn items_url(&self) -> String {
        format!(
            "{}/v1/vaults/{}/items",
            self.config.host.trim_end_matches('/'),
            self.config.vault_id
        )
    }

    fn failure(&self, reason: impl Into<String>) -> WalletError {
        WalletError::Save {
            sink: self.name(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Saver for VaultSaver {
    fn name(&self) -> &'static str {
        "vault"
    }

    async fn save(&self, ctx: &SaveContext, payload: &ExportPayload) -> Result<(), WalletError> {
        let item = VaultItem::build(&self.config.vault_id, ctx, &payload.document);

        let resp = self
            .client
            .post(self.items_url())
            .bearer_auth(&self.config.token)
            .json(&item)
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(self.failure(format!("{status}: {body}")));
        }

        let created: CreatedItem = resp
            .json()
            .await
            .map_err(|e| self.failure(format!("invalid response: {e}")))?;
        tracing::info!(item_id = %created.id, title = %item.title, "vault item created");
        Ok(())
    }
}
