//! Sinks that accept a finished export.
//!
//! The key manager and formatter never know where an export lands; they
//! hand an [`ExportPayload`] to a [`Saver`]. [`SaverSet`] runs several
//! savers in order and stops at the first failure.

mod file_system;
mod vault;

pub use file_system::FileSystemSaver;
pub use vault::{VaultItem, VaultSaver};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

use crate::config::KeygenConfig;
use crate::encryption::{EncryptedBlob, seal};
use crate::error::WalletError;
use crate::export::{ExportDocument, ExportFormatter};

/// Per-save metadata shared by every sink.
#[derive(Clone, Debug)]
pub struct SaveContext {
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
}

impl SaveContext {
    /// Context stamped with the current local time.
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(name, Local::now().fixed_offset())
    }

    pub fn at(name: impl Into<String>, created_at: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }

    /// `"{name} {RFC 3339 time}"` with spaces replaced by `-`.
    pub fn file_stem(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
        .replace(' ', "-")
    }

    /// `"{name} ({asctime})"`, the vault item title.
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, self.created_at.format("%a %b %e %H:%M:%S %Y"))
    }
}

/// What a saver receives: the document, and its sealed form when a
/// password was supplied.
#[derive(Clone, Debug)]
pub struct ExportPayload {
    pub document: ExportDocument,
    pub sealed: Option<EncryptedBlob>,
}

impl ExportPayload {
    pub fn plain(document: ExportDocument) -> Self {
        Self {
            document,
            sealed: None,
        }
    }

    /// Seal the document's JSON form under `password`.
    pub fn sealed(document: ExportDocument, password: &[u8]) -> Result<Self, WalletError> {
        let blob = seal(document.to_json()?.as_bytes(), password)?;
        Ok(Self {
            document,
            sealed: Some(blob),
        })
    }

    /// Build from a formatter, sealing when `password` is given.
    pub fn from_formatter(
        formatter: &ExportFormatter<'_>,
        password: Option<&str>,
    ) -> Result<Self, WalletError> {
        let document = formatter.document()?;
        match password {
            Some(p) => Self::sealed(document, p.as_bytes()),
            None => Ok(Self::plain(document)),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.is_some()
    }

    /// File extension for this payload.
    pub fn extension(&self) -> &'static str {
        if self.is_sealed() { "bin" } else { "json" }
    }

    /// Bytes as written to disk: the sealed blob, or the JSON document.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WalletError> {
        match &self.sealed {
            Some(blob) => Ok(blob.as_bytes().to_vec()),
            None => Ok(self.document.to_json()?.into_bytes()),
        }
    }
}

/// A destination for exports.
#[async_trait]
pub trait Saver: Send + Sync {
    /// Short sink name for logs and errors.
    fn name(&self) -> &'static str;

    async fn save(&self, ctx: &SaveContext, payload: &ExportPayload) -> Result<(), WalletError>;
}

/// Savers run in insertion order.
#[derive(Default)]
pub struct SaverSet {
    savers: Vec<Box<dyn Saver>>,
}

impl SaverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The vault saver when configured, then the file-system saver.
    pub fn from_config(config: &KeygenConfig) -> Result<Self, WalletError> {
        let mut set = Self::new();
        if let Some(vault) = &config.vault {
            set.push(VaultSaver::new(vault.clone())?);
        }
        set.push(FileSystemSaver::new(config.output_dir()?));
        Ok(set)
    }

    pub fn push(&mut self, saver: impl Saver + 'static) {
        self.savers.push(Box::new(saver));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.savers.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.savers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.savers.is_empty()
    }
}

#[async_trait]
impl Saver for SaverSet {
    fn name(&self) -> &'static str {
        "all"
    }

    async fn save(&self, ctx: &SaveContext, payload: &ExportPayload) -> Result<(), WalletError> {
        for saver in &self.savers {
            tracing::debug!(sink = saver.name(), "saving export");
            saver.save(ctx, payload).await?;
        }
        Ok(())
    }
}
