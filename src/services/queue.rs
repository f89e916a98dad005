use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::models::Task;

/// A task as it came off the queue. The raw payload travels along so that
/// acknowledge-after-completion mode can remove exactly this entry from the
/// processing list.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub task: Task,
    pub receipt: Option<String>,
}

/// Durable FIFO channel of task records between producer and consumer.
///
/// `push` and `pop` report failure as `false`/`None` instead of raising
/// across the component boundary, so callers can branch into compensation
/// without exception-style control flow.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a task to the tail of the channel. `false` on any transport
    /// failure; the caller decides on compensation.
    async fn push(&self, task: &Task) -> bool;

    /// Blocking pop: suspends until a task is available. `None` means a
    /// transport or decode failure, never an empty queue.
    async fn pop(&self) -> Option<QueuedTask>;

    /// Mark a popped task as fully handled. A no-op unless the queue runs in
    /// acknowledge-after-completion mode.
    async fn ack(&self, popped: &QueuedTask) -> bool;
}

/// Redis list-based queue: `LPUSH` at the head, blocking `RPOP` at the tail.
///
/// With `reliable` set, pops go through `BRPOPLPUSH` into a processing list
/// and stay there until acknowledged, so a worker crash mid-task does not
/// lose the task; [`RedisQueue::recover`] re-queues the leftovers.
pub struct RedisQueue {
    client: Arc<Client>,
    queue_name: String,
    reliable: bool,
}

impl RedisQueue {
    pub fn new(client: Arc<Client>, queue_name: impl Into<String>, reliable: bool) -> Self {
        Self {
            client,
            queue_name: queue_name.into(),
            reliable,
        }
    }

    fn processing_name(&self) -> String {
        format!("{}:processing", self.queue_name)
    }

    /// Move tasks that were popped but never acknowledged back onto the
    /// queue. Call once at startup, before the first pop.
    pub async fn recover(&self) -> Result<u64, redis::RedisError> {
        if !self.reliable {
            return Ok(0);
        }

        let mut conn = self.client.get_async_connection().await?;
        let processing = self.processing_name();
        let mut moved = 0;
        loop {
            let entry: Option<String> = conn.rpoplpush(&processing, &self.queue_name).await?;
            if entry.is_none() {
                break;
            }
            moved += 1;
        }
        Ok(moved)
    }
}

#[async_trait]
impl TaskQueue for RedisQueue {
    async fn push(&self, task: &Task) -> bool {
        let payload = match serde_json::to_string(task) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize task {}: {}", task.task_id, e);
                return false;
            }
        };

        let mut conn = match self.client.get_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to connect to Redis for push: {}", e);
                return false;
            }
        };

        match conn.lpush::<_, _, ()>(&self.queue_name, payload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to push task {}: {}", task.task_id, e);
                false
            }
        }
    }

    async fn pop(&self) -> Option<QueuedTask> {
        let mut conn = match self.client.get_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to connect to Redis for pop: {}", e);
                return None;
            }
        };

        // timeout 0 blocks indefinitely; the worker idles here between tasks
        let payload: String = if self.reliable {
            match conn
                .brpoplpush::<_, _, Option<String>>(&self.queue_name, self.processing_name(), 0.0)
                .await
            {
                Ok(Some(payload)) => payload,
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Failed to pop task from queue: {}", e);
                    return None;
                }
            }
        } else {
            match conn
                .brpop::<_, Option<(String, String)>>(&self.queue_name, 0.0)
                .await
            {
                Ok(Some((_, payload))) => payload,
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Failed to pop task from queue: {}", e);
                    return None;
                }
            }
        };

        match serde_json::from_str(&payload) {
            Ok(task) => Some(QueuedTask {
                task,
                receipt: Some(payload),
            }),
            Err(e) => {
                tracing::error!("Failed to decode task payload: {}", e);
                None
            }
        }
    }

    async fn ack(&self, popped: &QueuedTask) -> bool {
        if !self.reliable {
            return true;
        }
        let Some(receipt) = &popped.receipt else {
            return true;
        };

        let mut conn = match self.client.get_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to connect to Redis for ack: {}", e);
                return false;
            }
        };

        match conn
            .lrem::<_, _, i64>(self.processing_name(), 1, receipt)
            .await
        {
            Ok(removed) => removed > 0,
            Err(e) => {
                tracing::error!(
                    "Failed to acknowledge task {}: {}",
                    popped.task.task_id,
                    e
                );
                false
            }
        }
    }
}
