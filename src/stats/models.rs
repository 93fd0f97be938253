use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One of the team's match scores, joined with the match's competition
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TeamScoreRow {
    pub match_id: i64,
    pub competition_id: i64,
    pub competition_name: String,
    pub team_score: i32,
}

/// A score from a match the team played in, used to find opponents
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MatchScoreRow {
    pub match_id: i64,
    pub team_id: i64,
    pub team_score: i32,
}

/// An athlete's intensity reading from one training session
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RecentTraining {
    pub user_training_id: i64,
    pub training_id: i64,
    pub datetime: DateTime<Utc>,
    pub intensity: i32,
}

/// Derived statistics for one team. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team_id: i64,
    pub competitions_participated: u32,
    pub most_successful_competition_id: Option<i64>,
    pub most_successful_competition: Option<String>,
    /// Summed score in the most successful competition, 0 when there is none
    pub most_successful_competition_score: i64,
    pub average_age: Option<f64>,
    pub win_percentage: f64,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingRecommendation {
    NoRecentData,
    ModerateHeavy,
    HighIntensityHeavy,
    Balanced,
}

impl TrainingRecommendation {
    pub fn message(&self) -> &'static str {
        match self {
            TrainingRecommendation::NoRecentData => "No recent training data available.",
            TrainingRecommendation::ModerateHeavy => {
                "You are doing a good amount of moderate intensity training. Keep it up!"
            }
            TrainingRecommendation::HighIntensityHeavy => {
                "You are doing a lot of high intensity training. Consider incorporating more moderate intensity sessions."
            }
            TrainingRecommendation::Balanced => {
                "Your training intensity is well balanced. Continue with your current routine."
            }
        }
    }
}

/// Target heart-rate bands derived from the age-based maximum heart rate.
/// Both bands are inclusive and meet at 70% of the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateZones {
    pub max_heart_rate: f64,
    pub moderate_min: f64,
    pub moderate_max: f64,
    pub high_min: f64,
    pub high_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityZone {
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecommendationReport {
    pub recommendation: TrainingRecommendation,
    pub message: String,
    pub zones: HeartRateZones,
    pub moderate_count: u32,
    pub high_count: u32,
    pub total: u32,
}

/// Recent sessions of one athlete together with the recommendation drawn from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteTrainingSummary {
    pub user_id: i64,
    pub age: i32,
    pub recent_trainings: Vec<RecentTraining>,
    pub report: TrainingRecommendationReport,
}
