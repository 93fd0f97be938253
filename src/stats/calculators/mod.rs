mod team_statistics;
mod training_recommendation;

pub use team_statistics::TeamStatisticsCalculator;
pub use training_recommendation::{
    TrainingRecommendationGenerator, HIGH_UPPER_PERCENT, MAX_HEART_RATE_BASE,
    MODERATE_LOWER_PERCENT, MODERATE_UPPER_PERCENT,
};
