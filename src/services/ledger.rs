use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::models::{AccountStats, DailyStats, HistoryEntry};

/// Durable per-user credit ledger backed by SQLite.
///
/// Every mutation is a single conditional statement. The balance check and
/// the decrement in [`Ledger::spend_one`] are one `UPDATE`, so concurrent
/// callers for the same user cannot both take the last credit.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the ledger database, creating the file and schema if missing.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let ledger = Self::new(pool);
        ledger.init_schema().await?;
        Ok(ledger)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 user_id INTEGER PRIMARY KEY,
                 balance INTEGER NOT NULL,
                 total_processed INTEGER NOT NULL DEFAULT 0,
                 registered_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS processing_history (
                 history_id INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id INTEGER NOT NULL,
                 source_reference TEXT NOT NULL,
                 result_reference TEXT NOT NULL,
                 completed_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                 FOREIGN KEY (user_id) REFERENCES users (user_id)
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the account if absent. Returns whether it was newly created;
    /// calling it on an existing account changes nothing.
    pub async fn ensure_account(
        &self,
        user_id: i64,
        starting_balance: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT OR IGNORE INTO users (user_id, balance) VALUES (?, ?)")
            .bind(user_id)
            .bind(starting_balance)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn read_stats(&self, user_id: i64) -> Result<Option<AccountStats>, sqlx::Error> {
        sqlx::query_as::<_, AccountStats>(
            "SELECT balance, total_processed FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Atomically debit one credit and bump the processed counter, but only
    /// while the balance is positive. Returns whether the debit happened.
    pub async fn spend_one(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users
             SET balance = balance - 1, total_processed = total_processed + 1
             WHERE user_id = ? AND balance > 0",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Add `delta` to the balance, or overwrite it when `absolute` is set.
    /// Returns the resulting balance, or `None` when no such account exists.
    /// Never creates a row.
    pub async fn adjust_balance(
        &self,
        user_id: i64,
        delta: i64,
        absolute: bool,
    ) -> Result<Option<i64>, sqlx::Error> {
        let sql = if absolute {
            "UPDATE users SET balance = ? WHERE user_id = ? RETURNING balance"
        } else {
            "UPDATE users SET balance = balance + ? WHERE user_id = ? RETURNING balance"
        };

        let row = sqlx::query(sql)
            .bind(delta)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<i64, _>("balance")))
    }

    /// Append a completed-transformation record. History is write-once.
    pub async fn record_history(
        &self,
        user_id: i64,
        source_reference: &str,
        result_reference: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO processing_history (user_id, source_reference, result_reference)
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(source_reference)
        .bind(result_reference)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn history_for_user(&self, user_id: i64) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, HistoryEntry>(
            "SELECT history_id, user_id, source_reference, result_reference, completed_at
             FROM processing_history
             WHERE user_id = ?
             ORDER BY history_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Aggregate snapshot over the last 24 hours plus all-time totals, for
    /// the scheduled operator report.
    pub async fn daily_stats(&self) -> Result<DailyStats, sqlx::Error> {
        let new_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(user_id) FROM users WHERE registered_at >= datetime('now', '-1 day')",
        )
        .fetch_one(&self.pool)
        .await?;

        let processed_photos: i64 = sqlx::query_scalar(
            "SELECT COUNT(history_id) FROM processing_history
             WHERE completed_at >= datetime('now', '-1 day')",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM processing_history
             WHERE completed_at >= datetime('now', '-1 day')",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(user_id) FROM users")
            .fetch_one(&self.pool)
            .await?;

        // SUM over an empty table is NULL, not zero
        let total_processed_ever: Option<i64> =
            sqlx::query_scalar("SELECT SUM(total_processed) FROM users")
                .fetch_one(&self.pool)
                .await?;

        Ok(DailyStats {
            new_users,
            processed_photos,
            active_users,
            total_users,
            total_processed_ever: total_processed_ever.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_ledger() -> Ledger {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let ledger = Ledger::new(pool);
        ledger.init_schema().await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn ensure_account_is_idempotent() {
        let ledger = memory_ledger().await;

        assert!(ledger.ensure_account(1, 5).await.unwrap());
        assert!(!ledger.ensure_account(1, 100).await.unwrap());

        // the second call must not touch the balance
        let stats = ledger.read_stats(1).await.unwrap().unwrap();
        assert_eq!(stats.balance, 5);
        assert_eq!(stats.total_processed, 0);
    }

    #[tokio::test]
    async fn read_stats_absent_account() {
        let ledger = memory_ledger().await;
        assert!(ledger.read_stats(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn spend_one_stops_at_zero() {
        let ledger = memory_ledger().await;
        ledger.ensure_account(1, 2).await.unwrap();

        assert!(ledger.spend_one(1).await.unwrap());
        assert!(ledger.spend_one(1).await.unwrap());
        assert!(!ledger.spend_one(1).await.unwrap());

        let stats = ledger.read_stats(1).await.unwrap().unwrap();
        assert_eq!(stats.balance, 0);
        assert_eq!(stats.total_processed, 2);
    }

    #[tokio::test]
    async fn spend_one_unknown_user_fails() {
        let ledger = memory_ledger().await;
        assert!(!ledger.spend_one(9).await.unwrap());
    }

    #[tokio::test]
    async fn adjust_balance_relative_and_absolute() {
        let ledger = memory_ledger().await;
        ledger.ensure_account(1, 1).await.unwrap();

        assert_eq!(ledger.adjust_balance(1, 4, false).await.unwrap(), Some(5));
        assert_eq!(ledger.adjust_balance(1, 2, true).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn adjust_balance_missing_user_creates_nothing() {
        let ledger = memory_ledger().await;

        assert_eq!(ledger.adjust_balance(42, 5, true).await.unwrap(), None);
        assert!(ledger.read_stats(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_is_append_only_per_user() {
        let ledger = memory_ledger().await;
        ledger.ensure_account(1, 1).await.unwrap();

        ledger.record_history(1, "in/a.png", "out/a.png").await.unwrap();
        ledger.record_history(1, "in/b.png", "out/b.png").await.unwrap();

        let entries = ledger.history_for_user(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source_reference, "in/a.png");
        assert_eq!(entries[1].result_reference, "out/b.png");
    }
}
