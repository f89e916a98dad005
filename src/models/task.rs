use serde::{Deserialize, Serialize};

/// One unit of queued work: a single image awaiting transformation.
///
/// Immutable once created. The `task_id` exists purely for tracing; the
/// queue identifies a task by its position, nothing else.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub task_id: String,
    pub user_id: i64,
    pub source_reference: String,
}

impl Task {
    pub fn new(user_id: i64, source_reference: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            source_reference: source_reference.into(),
        }
    }
}
