use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Opaque blob store. The API only ever hands out the key it stored an
/// object under; how bytes live behind that key is not its concern.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Filesystem-backed store rooted at the configured upload directory.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("create upload directory")?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write object {key}"))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            // Deleting an already-gone blob is not an error worth surfacing.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("delete object {key}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("stockroom-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(&dir);

        storage
            .put_object("products/p1/a.jpg", Bytes::from_static(b"hello"), "image/jpeg")
            .await
            .expect("put should succeed");
        let on_disk = tokio::fs::read(dir.join("products/p1/a.jpg"))
            .await
            .expect("file should exist");
        assert_eq!(on_disk, b"hello");

        storage
            .delete_object("products/p1/a.jpg")
            .await
            .expect("delete should succeed");
        assert!(tokio::fs::metadata(dir.join("products/p1/a.jpg"))
            .await
            .is_err());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn delete_missing_object_is_ok() {
        let dir = std::env::temp_dir().join(format!("stockroom-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(&dir);
        storage
            .delete_object("does/not/exist.jpg")
            .await
            .expect("missing object should not error");
    }
}
