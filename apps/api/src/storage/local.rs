use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{decode_document, encode_document, Loaded, PromptStore, StoreError};
use crate::models::PromptRecord;

/// The prompt document as a single JSON file on disk.
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PromptStore for LocalFileStore {
    /// A missing file is a first run on this machine and loads as an empty
    /// document.
    async fn load(&self) -> Result<Loaded, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "prompt file not found, starting empty");
                return Ok(Loaded::Records(Vec::new()));
            }
            Err(e) => return Err(e.into()),
        };
        let records = decode_document(&raw)?;
        debug!(path = %self.path.display(), count = records.len(), "loaded prompt file");
        Ok(Loaded::Records(records))
    }

    async fn save(&self, records: &[PromptRecord]) -> Result<(), StoreError> {
        let content = encode_document(records)?;
        let path = self.path.clone();
        let count = records.len();

        // Temp file in the target directory + rename, so readers never see a
        // half-written document.
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;

        info!(path = %self.path.display(), count, "saved prompt file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }
}
