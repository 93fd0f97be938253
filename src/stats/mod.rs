pub mod calculators;
pub mod handlers;
pub mod service;

mod errors;
pub mod models;
pub mod repository;

pub use errors::StatsError;
pub use handlers::{team_statistics, training_recommendation};
pub use models::*;
pub use repository::StatsRepository;
pub use service::StatsService;
