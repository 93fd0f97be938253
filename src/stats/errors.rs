use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Team {0} not found")]
    TeamNotFound(i64),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Repository error: {0}")]
    Repository(String),
}
