// Custom error types and result aliases for the submission and worker paths,
// built on thiserror.
use thiserror::Error;

pub mod worker;

// Re-export commonly used types
pub use worker::{WorkerError, WorkerResult};

#[derive(Error, Debug)]
pub enum AppError {
    // The #[from] attribute converts a sqlx::Error into AppError::Ledger via the From trait.
    #[error("Ledger error: {0}")]
    Ledger(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
