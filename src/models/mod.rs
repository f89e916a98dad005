mod account;
mod task;

pub use account::{AccountStats, DailyStats, HistoryEntry};
pub use task::Task;
