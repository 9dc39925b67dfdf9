use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{ExportPayload, SaveContext, Saver};
use crate::error::WalletError;

/// Writes each export to its own file under a directory.
#[derive(Clone, Debug)]
pub struct FileSystemSaver {
    dir: PathBuf,
}

impl FileSystemSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target file for `payload` saved under `ctx`.
    pub fn path_for(&self, ctx: &SaveContext, payload: &ExportPayload) -> PathBuf {
        self.dir
            .join(format!("{}.{}", ctx.file_stem(), payload.extension()))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl Saver for FileSystemSaver {
    fn name(&self) -> &'static str {
        "file system"
    }

    async fn save(&self, ctx: &SaveContext, payload: &ExportPayload) -> Result<(), WalletError> {
        let path = self.path_for(ctx, payload);
        let bytes = payload.to_bytes()?;
        self.write(&path, &bytes).await.map_err(|e| WalletError::Save {
            sink: self.name(),
            reason: format!("{}: {e}", path.display()),
        })?;

        if !payload.is_sealed() && payload.document.recovery_phrase.is_some() {
            tracing::warn!(path = %path.display(), "recovery phrase written without encryption");
        }
        tracing::info!(
            path = %path.display(),
            sealed = payload.is_sealed(),
            "export written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::{EncryptedBlob, open};
    use crate::export::ExportDocument;
    use chrono::DateTime;

    fn document() -> ExportDocument {
        ExportDocument {
            recovery_phrase: Some("abandon about".into()),
            mnemonic_password: None,
            seed: "ab".repeat(64),
            root_key: "xprv-root".into(),
            evm_accounts: Vec::new(),
            bitcoin_accounts: Vec::new(),
        }
    }

    fn ctx() -> SaveContext {
        SaveContext::at(
            "Cold Storage",
            DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap(),
        )
    }

    #[tokio::test]
    async fn writes_json_when_unsealed() {
        let dir = tempfile::tempdir().unwrap();
        let saver = FileSystemSaver::new(dir.path());
        let payload = ExportPayload::plain(document());

        saver.save(&ctx(), &payload).await.unwrap();

        let path = dir.path().join("Cold-Storage-2024-01-02T03:04:05Z.json");
        assert_eq!(saver.path_for(&ctx(), &payload), path);
        let written = std::fs::read(&path).unwrap();
        assert_eq!(ExportDocument::from_json(&written).unwrap(), document());
    }

    #[tokio::test]
    async fn writes_blob_when_sealed() {
        let dir = tempfile::tempdir().unwrap();
        let saver = FileSystemSaver::new(dir.path());
        let payload = ExportPayload::sealed(document(), b"pw").unwrap();

        saver.save(&ctx(), &payload).await.unwrap();

        let path = saver.path_for(&ctx(), &payload);
        assert_eq!(path.extension().unwrap(), "bin");
        let blob = EncryptedBlob::from_bytes(std::fs::read(&path).unwrap()).unwrap();
        let plain = open(&blob, b"pw").unwrap();
        assert_eq!(ExportDocument::from_json(&plain).unwrap(), document());
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let saver = FileSystemSaver::new(&nested);

        saver
            .save(&ctx(), &ExportPayload::plain(document()))
            .await
            .unwrap();
        assert!(nested.is_dir());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn concurrent_saves_share_one_runtime_thread() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileSystemSaver::new(dir.path().join("a"));
        let b = FileSystemSaver::new(dir.path().join("b"));
        let plain = ExportPayload::plain(document());
        let sealed = ExportPayload::sealed(document(), b"pw").unwrap();

        let (ctx_a, ctx_b) = (ctx(), ctx());
        let (ra, rb) = tokio::join!(a.save(&ctx_a, &plain), b.save(&ctx_b, &sealed));
        ra.unwrap();
        rb.unwrap();

        assert!(a.path_for(&ctx(), &plain).is_file());
        assert!(b.path_for(&ctx(), &sealed).is_file());
    }

    #[tokio::test]
    async fn unwritable_target_is_save_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let saver = FileSystemSaver::new(&blocker);

        let err = saver
            .save(&ctx(), &ExportPayload::plain(document()))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Save { sink: "file system", .. }));
    }
}
