use crate::models::DailyStats;

/// Every user- or operator-facing reply the pipeline produces.
///
/// Each variant carries exactly the parameters its text needs, so a missing
/// parameter is a construction error rather than a half-formatted string
/// falling back to the raw template.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Welcome,
    WelcomeBack,
    Info,
    Help,
    Instructions,
    Stats { balance: i64, total_processed: i64 },
    NoCredits,
    InvalidFileType,
    FileTooLarge { max_mb: u64 },
    SubmissionAccepted,
    SystemError,
    TryAgain,
    ProcessingComplete,
    AdminCreditsUpdated { user_id: i64, new_balance: i64 },
    AdminUserNotFound { user_id: i64 },
    AdminInvalidCommand,
    AdminUnauthorized,
    DailyReport(DailyStats),
}

impl Message {
    pub fn text(&self) -> String {
        match self {
            Message::Welcome => {
                "Welcome! You have been registered. Send a photo to get it processed.".into()
            }
            Message::WelcomeBack => "Welcome back! Send a photo to get it processed.".into(),
            Message::Info => {
                "This bot applies a blur effect to photos. Each processed photo costs one credit."
                    .into()
            }
            Message::Help => {
                "Send a photo to process it. /stats shows your balance, /info explains the service."
                    .into()
            }
            Message::Instructions => {
                "Attach a photo (or an image document) and send it. The result arrives once a worker has processed it."
                    .into()
            }
            Message::Stats {
                balance,
                total_processed,
            } => format!(
                "Your balance: {} credits. Photos processed: {}.",
                balance, total_processed
            ),
            Message::NoCredits => {
                "You have no credits left. Ask an administrator to top up your balance.".into()
            }
            Message::InvalidFileType => {
                "That file does not look like an image. Please send a photo.".into()
            }
            Message::FileTooLarge { max_mb } => {
                format!("The file is too large. The limit is {} MB.", max_mb)
            }
            Message::SubmissionAccepted => {
                "Your photo is queued for processing. One credit has been charged.".into()
            }
            Message::SystemError => "A system error occurred, please try again later.".into(),
            Message::TryAgain => "An unexpected error occurred. Please try again.".into(),
            Message::ProcessingComplete => "Here is your processed photo!".into(),
            Message::AdminCreditsUpdated {
                user_id,
                new_balance,
            } => format!("Balance of user {} is now {}.", user_id, new_balance),
            Message::AdminUserNotFound { user_id } => {
                format!("User {} not found.", user_id)
            }
            Message::AdminInvalidCommand => {
                "Usage: /add <user_id> <amount> or /set <user_id> <amount>".into()
            }
            Message::AdminUnauthorized => "You are not allowed to use this command.".into(),
            Message::DailyReport(stats) => format!(
                "Daily report\nNew users: {}\nPhotos processed: {}\nActive users: {}\nTotal users: {}\nCredits charged overall: {}",
                stats.new_users,
                stats.processed_photos,
                stats.active_users,
                stats.total_users,
                stats.total_processed_ever
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_text_carries_both_numbers() {
        let text = Message::Stats {
            balance: 4,
            total_processed: 11,
        }
        .text();
        assert!(text.contains('4'));
        assert!(text.contains("11"));
    }

    #[test]
    fn admin_update_names_the_target() {
        let text = Message::AdminCreditsUpdated {
            user_id: 99,
            new_balance: 5,
        }
        .text();
        assert!(text.contains("99"));
        assert!(text.contains('5'));
    }
}
