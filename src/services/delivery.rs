use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

/// Hands a finished result back to its user. The production chat transport
/// lives outside this crate; the daemon ships with a filesystem outbox the
/// transport tails.
#[async_trait]
pub trait ResultDelivery: Send + Sync {
    async fn deliver(&self, user_id: i64, image: Bytes, caption: &str) -> io::Result<()>;
}

/// Writes each result as an image file plus a caption file under a per-user
/// directory.
pub struct OutboxDelivery {
    root: PathBuf,
}

impl OutboxDelivery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResultDelivery for OutboxDelivery {
    async fn deliver(&self, user_id: i64, image: Bytes, caption: &str) -> io::Result<()> {
        let dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let name = uuid::Uuid::new_v4().simple().to_string();
        tokio::fs::write(dir.join(format!("{}.img", name)), &image).await?;
        tokio::fs::write(dir.join(format!("{}.txt", name)), caption.as_bytes()).await?;

        tracing::debug!("Delivered result for user {} to outbox", user_id);
        Ok(())
    }
}
