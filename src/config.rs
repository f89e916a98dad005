use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub redis: RedisConfig,
    pub worker: WorkerConfig,
    pub upload: UploadConfig,
    pub user: UserConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub queue_name: String,
    /// When true, pops go through a processing list and must be acknowledged
    /// after completion; unacknowledged tasks survive a worker crash.
    pub reliable: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    pub worker_count: usize,
    pub task_deadline_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64, // in bytes
    pub storage_dir: String,
    pub outbox_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub starting_balance: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub admin_ids: Vec<i64>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?;

        config.try_deserialize()
    }
}
