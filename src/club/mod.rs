// Public API - what other modules can use
pub use postgres::PostgresClubRepository;
pub use repository::{ClubRepository, InMemoryClubRepository, MatchTeamResult};
pub use service::ClubService;

pub mod handlers;
pub mod models;
mod postgres;
pub mod repository;
mod service;
pub mod types;
