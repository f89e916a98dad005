mod admin;
mod commands;
mod submission;

pub use admin::{parse_admin_command, AdminCommand, AdminPolicy};
pub use commands::CommandHandler;
pub use submission::{SubmissionRequest, UploadLimits};
