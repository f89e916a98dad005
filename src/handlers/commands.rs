use std::sync::Arc;

use crate::errors::AppResult;
use crate::handlers::admin::AdminPolicy;
use crate::handlers::submission::UploadLimits;
use crate::messages::Message;
use crate::services::{AlertSink, ArtifactStore, Ledger, TaskQueue};

/// Entry points the chat transport invokes. Owns every collaborator it
/// needs, including the admin allow-list; there is no ambient state.
pub struct CommandHandler {
    pub(crate) ledger: Ledger,
    pub(crate) queue: Arc<dyn TaskQueue>,
    pub(crate) storage: Arc<dyn ArtifactStore>,
    pub(crate) alerts: Arc<dyn AlertSink>,
    pub(crate) admins: AdminPolicy,
    pub(crate) limits: UploadLimits,
    pub(crate) starting_balance: i64,
}

impl CommandHandler {
    pub fn new(
        ledger: Ledger,
        queue: Arc<dyn TaskQueue>,
        storage: Arc<dyn ArtifactStore>,
        alerts: Arc<dyn AlertSink>,
        admins: AdminPolicy,
        limits: UploadLimits,
        starting_balance: i64,
    ) -> Self {
        Self {
            ledger,
            queue,
            storage,
            alerts,
            admins,
            limits,
            starting_balance,
        }
    }

    /// `/start`: register the account on first contact.
    pub async fn handle_start(&self, user_id: i64) -> Message {
        match self
            .ledger
            .ensure_account(user_id, self.starting_balance)
            .await
        {
            Ok(true) => Message::Welcome,
            Ok(false) => Message::WelcomeBack,
            Err(e) => {
                tracing::error!("Failed to ensure account for {}: {}", user_id, e);
                Message::TryAgain
            }
        }
    }

    /// `/stats`: balance and processed count. First contact through this
    /// command still registers the account.
    pub async fn handle_stats(&self, user_id: i64) -> Message {
        match self.ledger.read_stats(user_id).await {
            Ok(Some(stats)) => Message::Stats {
                balance: stats.balance,
                total_processed: stats.total_processed,
            },
            Ok(None) => match self
                .ledger
                .ensure_account(user_id, self.starting_balance)
                .await
            {
                Ok(_) => Message::Stats {
                    balance: self.starting_balance,
                    total_processed: 0,
                },
                Err(e) => {
                    tracing::error!("Failed to register {} via stats: {}", user_id, e);
                    Message::TryAgain
                }
            },
            Err(e) => {
                tracing::error!("Failed to read stats for {}: {}", user_id, e);
                Message::TryAgain
            }
        }
    }

    /// `/info`, `/help`, `/instruct`: static texts.
    pub fn handle_info(&self, command: &str) -> Message {
        match command.trim_start_matches('/') {
            "info" => Message::Info,
            "instruct" => Message::Instructions,
            _ => Message::Help,
        }
    }

    /// Renders the aggregate snapshot the scheduled reporter sends to
    /// operators. Scheduling itself lives outside this crate.
    pub async fn daily_report(&self) -> AppResult<Message> {
        let stats = self.ledger.daily_stats().await?;
        Ok(Message::DailyReport(stats))
    }
}
