use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use photoqueue::config::Config;
use photoqueue::services::{
    FsArtifactStore, GaussianBlur, Ledger, LogAlerts, OutboxDelivery, RedisQueue,
};
use photoqueue::worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    let ledger = Ledger::connect(&config.ledger.url)
        .await
        .context("Failed to open ledger database")?;

    // Initialize Redis client
    let redis_client = Arc::new(
        redis::Client::open(config.redis.url.clone()).context("Failed to connect to Redis")?,
    );
    let queue = RedisQueue::new(
        redis_client,
        config.redis.queue_name.clone(),
        config.redis.reliable,
    );

    // Put tasks orphaned by a previous crash back in line before popping.
    let recovered = queue
        .recover()
        .await
        .context("Failed to recover in-flight tasks")?;
    if recovered > 0 {
        tracing::info!("Re-queued {} unacknowledged tasks", recovered);
    }

    let queue = Arc::new(queue);
    let storage = Arc::new(FsArtifactStore::new(&config.upload.storage_dir));
    let delivery = Arc::new(OutboxDelivery::new(&config.upload.outbox_dir));
    let transform = Arc::new(GaussianBlur::default());
    let alerts = Arc::new(LogAlerts);

    // Spawn the worker pool
    let mut workers = Vec::new();
    for _ in 0..config.worker.worker_count {
        let worker = Worker::new(
            ledger.clone(),
            queue.clone(),
            storage.clone(),
            transform.clone(),
            delivery.clone(),
            alerts.clone(),
            Duration::from_secs(config.worker.task_deadline_secs),
        );
        workers.push(tokio::spawn(async move { worker.run().await }));
    }
    tracing::info!(
        "Started {} workers on queue '{}'",
        config.worker.worker_count,
        config.redis.queue_name
    );

    for handle in workers {
        handle.await?;
    }
    Ok(())
}
