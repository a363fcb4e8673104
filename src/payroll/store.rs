use std::path::{Path, PathBuf};

use async_trait::async_trait;
use derive_more::{Display, From};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::StoreError;

/// Where a stored document can be read back from.
#[derive(Debug, Clone, PartialEq, Eq, Display, From, Serialize, ToSchema)]
#[display(fmt = "{}", _0)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used as the attachment filename.
    pub fn file_name(&self) -> &str {
        self.0.rsplit(['/', '\\']).next().unwrap_or(&self.0)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<DocumentHandle, StoreError>;
    async fn read(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StoreError>;
}

/// Stores documents as files under one directory.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<DocumentHandle, StoreError> {
        let err = |source: std::io::Error| StoreError {
            name: name.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.root).await.map_err(err)?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await.map_err(err)?;

        tracing::debug!(path = %path.display(), "Payslip document stored");
        Ok(DocumentHandle::from(path.to_string_lossy().into_owned()))
    }

    async fn read(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(handle.as_str())
            .await
            .map_err(|source| StoreError {
                name: handle.to_string(),
                source,
            })
    }
}
