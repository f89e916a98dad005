use std::path::Path;

use bytes::Bytes;

use crate::errors::AppResult;
use crate::handlers::commands::CommandHandler;
use crate::messages::Message;
use crate::models::Task;
use crate::services::AlertKind;

/// One inbound image submission as handed over by the chat transport.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub user_id: i64,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size: u64, // in bytes
}

impl CommandHandler {
    /// The full submission path: balance gate, validation, artifact
    /// persistence, atomic debit, enqueue.
    ///
    /// Never returns an error: every outcome maps to a reply, and an
    /// unexpected failure becomes a generic retry message so the user is
    /// never shown an internal error.
    pub async fn handle_photo(&self, request: SubmissionRequest) -> Message {
        match self.submit(&request).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Submission failed for user {}: {}", request.user_id, e);
                Message::TryAgain
            }
        }
    }

    async fn submit(&self, request: &SubmissionRequest) -> AppResult<Message> {
        // First contact through a photo still creates the account.
        self.ledger
            .ensure_account(request.user_id, self.starting_balance)
            .await?;

        let stats = self.ledger.read_stats(request.user_id).await?;
        if !stats.map_or(false, |s| s.balance > 0) {
            return Ok(Message::NoCredits);
        }

        if !is_supported_image(request) {
            return Ok(Message::InvalidFileType);
        }
        if request.bytes.len() as u64 > self.limits.max_file_size {
            return Ok(Message::FileTooLarge {
                max_mb: self.limits.max_file_size / (1024 * 1024),
            });
        }

        let file_name = artifact_name(request.user_id, &request.file_name);
        let source_reference = self.storage.store(&file_name, &request.bytes).await?;

        // The balance gate above can go stale under concurrent submissions;
        // the debit itself re-checks atomically.
        if !self.ledger.spend_one(request.user_id).await? {
            return Ok(Message::NoCredits);
        }

        let task = Task::new(request.user_id, source_reference);
        if self.queue.push(&task).await {
            tracing::info!("Enqueued task {} for user {}", task.task_id, task.user_id);
            Ok(Message::SubmissionAccepted)
        } else {
            // The debit and the enqueue are not one transaction; the credit
            // must be handed back or it leaks on every broker outage.
            if self
                .ledger
                .adjust_balance(request.user_id, 1, false)
                .await?
                .is_none()
            {
                tracing::error!("Refund target account {} is missing", request.user_id);
            }
            self.alerts
                .alert(
                    AlertKind::QueueError,
                    "Task enqueue failed",
                    &format!("user_id: {}", request.user_id),
                )
                .await;
            Ok(Message::SystemError)
        }
    }
}

fn is_supported_image(request: &SubmissionRequest) -> bool {
    if let Some(mime) = &request.mime_type {
        return mime.starts_with("image/");
    }
    match extension(&request.file_name) {
        Some(ext) => matches!(
            ext.to_ascii_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp"
        ),
        None => false,
    }
}

fn extension(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|e| e.to_str())
}

// Artifact names carry the owner and a fresh uuid so uploads never collide.
fn artifact_name(user_id: i64, original: &str) -> String {
    let ext = extension(original)
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}_{}{}", user_id, uuid::Uuid::new_v4().simple(), ext)
}
