mod alerts;
mod delivery;
mod ledger;
mod queue;
mod storage;
mod transform;

pub use alerts::{AlertKind, AlertSink, LogAlerts};
pub use delivery::{OutboxDelivery, ResultDelivery};
pub use ledger::Ledger;
pub use queue::{QueuedTask, RedisQueue, TaskQueue};
pub use storage::{ArtifactStore, FsArtifactStore};
pub use transform::{GaussianBlur, ImageTransform, TransformError};
