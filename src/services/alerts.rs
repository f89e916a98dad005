use async_trait::async_trait;

/// What went wrong, for operator triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    ProcessingError,
    SendError,
    WorkerCrash,
    QueueError,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ProcessingError => "PROCESSING_ERROR",
            AlertKind::SendError => "SEND_ERROR",
            AlertKind::WorkerCrash => "WORKER_CRASH",
            AlertKind::QueueError => "QUEUE_ERROR",
        }
    }
}

/// Fire-and-forget operational alerting. Implementations swallow their own
/// delivery failures; alerting must never take the pipeline down with it.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, kind: AlertKind, message: &str, context: &str);
}

/// Writes alerts to the log. Stands in wherever no operator channel is wired.
pub struct LogAlerts;

#[async_trait]
impl AlertSink for LogAlerts {
    async fn alert(&self, kind: AlertKind, message: &str, context: &str) {
        tracing::error!("[{}] {} ({})", kind.as_str(), message, context);
    }
}
