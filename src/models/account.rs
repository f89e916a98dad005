use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of one account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountStats {
    pub balance: i64,
    /// Credits charged so far. Incremented at debit time and never
    /// decremented on refund, so it counts attempts, not deliveries.
    pub total_processed: i64,
}

/// Append-only record of one completed transformation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryEntry {
    pub history_id: i64,
    pub user_id: i64,
    pub source_reference: String,
    pub result_reference: String,
    pub completed_at: NaiveDateTime,
}

/// Aggregates for the scheduled operator report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    pub new_users: i64,
    pub processed_photos: i64,
    pub active_users: i64,
    pub total_users: i64,
    pub total_processed_ever: i64,
}
