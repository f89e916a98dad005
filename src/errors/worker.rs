use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Task timed out after {0} seconds")]
    Timeout(u64),

    #[error("Task panicked: {0}")]
    TaskPanic(String),

    #[error("Source artifact not found: {0}")]
    SourceMissing(String),

    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Account {0} not found for refund")]
    MissingAccount(i64),

    #[error("Ledger error: {0}")]
    Ledger(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
