use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

/// Opaque-reference artifact storage. References round-trip between `store`
/// and `load`; callers never interpret them.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> io::Result<String>;
    async fn load(&self, reference: &str) -> io::Result<Bytes>;
}

/// Filesystem store rooted at a configured directory; the reference is the
/// file path.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes).await?;

        let reference = path
            .to_str()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "non-UTF-8 storage path"))?
            .to_string();
        tracing::debug!("Stored artifact at {}", reference);
        Ok(reference)
    }

    async fn load(&self, reference: &str) -> io::Result<Bytes> {
        let data = tokio::fs::read(reference).await?;
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        let reference = store.store("1_abc.png", b"pixels").await.unwrap();
        let loaded = store.load(&reference).await.unwrap();
        assert_eq!(&loaded[..], b"pixels");
    }

    #[tokio::test]
    async fn load_of_unknown_reference_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        let missing = dir.path().join("nope.png");
        let err = store.load(missing.to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
