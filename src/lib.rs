// Library crate for the club statistics server
// This file exposes the public API for integration tests

pub mod club;
pub mod config;
pub mod router;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use club::{ClubRepository, ClubService, InMemoryClubRepository, PostgresClubRepository};
pub use config::AppConfig;
pub use router::build_router;
pub use shared::{AppError, AppState};
pub use stats::{StatsError, StatsRepository, StatsService};
