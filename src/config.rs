use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RECENT_TRAINING_LIMIT: usize = 10;

/// Runtime configuration read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// How many of an athlete's latest training sessions feed the recommendation
    pub recent_training_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            recent_training_limit: DEFAULT_RECENT_TRAINING_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let recent_training_limit = lookup("RECENT_TRAINING_LIMIT")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_RECENT_TRAINING_LIMIT);

        Self {
            database_url,
            bind_addr,
            recent_training_limit,
        }
    }
}
