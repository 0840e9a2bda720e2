use std::path::PathBuf;

use crate::service::TaskService;
use crate::store::JsonTaskStore;

/// Overrides the data file location.
pub const DATA_ENV: &str = "TASK_TRACKER_DATA";
/// Truthy values (`1`, `true`, `yes`, `on`) enable the advisory lock.
pub const LOCK_ENV: &str = "TASK_TRACKER_LOCK";
pub const DEFAULT_FILE: &str = "tasks.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub lock: bool,
}

impl Config {
    /// Explicit values win; otherwise fall back to the environment, then defaults.
    pub fn resolve(data: Option<PathBuf>, lock: bool) -> Self {
        let data_path = data
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(data_path_from_env)
            .unwrap_or_else(default_data_path);
        Self {
            data_path,
            lock: lock || lock_from_env(),
        }
    }

    pub fn open_service(&self) -> TaskService<JsonTaskStore> {
        tracing::debug!(path = %self.data_path.display(), lock = self.lock, "opening task store");
        TaskService::new(JsonTaskStore::open(&self.data_path).with_locking(self.lock))
    }
}

/// `$TASK_TRACKER_DATA`, ignoring an empty value.
pub fn data_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DATA_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn lock_from_env() -> bool {
    std::env::var(LOCK_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// `tasks.json` in the current directory, or bare `tasks.json` if cwd is unreadable.
pub fn default_data_path() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_FILE))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_FILE))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
