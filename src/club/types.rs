use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::models::{
    Competition, Match, MatchTeam, Team, TeamScore, Training, User, UserTraining,
};
use crate::stats::{AthleteTrainingSummary, TeamStatistics};

/// Header carrying the caller's role for role-gated operations
pub const ROLE_HEADER: &str = "x-club-role";

/// Team page: the team itself plus its derived statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamDetailResponse {
    pub team: Team,
    pub statistics: TeamStatistics,
}

/// Result line of a completed match (exactly two teams recorded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: i64,
    pub team1: String,
    pub score1: i32,
    pub team2: String,
    pub score2: i32,
    pub duration_minutes: i32,
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompetitionDetailResponse {
    pub competition: Competition,
    pub matches: Vec<MatchResult>,
}

/// Request payload for creating or replacing a match between two teams
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
    pub competition_id: i64,
    pub team1_id: i64,
    pub team1_score: i32,
    pub team2_id: i64,
    pub team2_score: i32,
}

impl MatchRequest {
    pub fn scores(&self) -> [TeamScore; 2] {
        [
            TeamScore {
                team_id: self.team1_id,
                team_score: self.team1_score,
            },
            TeamScore {
                team_id: self.team2_id,
                team_score: self.team2_score,
            },
        ]
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchDetailResponse {
    #[serde(rename = "match")]
    pub details: Match,
    pub teams: Vec<MatchTeam>,
}

/// One athlete enrolled while creating a training
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
    pub user_id: i64,
    pub sensor_id: i64,
    pub intensity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrainingRequest {
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub participants: Vec<Enrollment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResponse {
    pub training: Training,
    pub participants: Vec<UserTraining>,
}

/// Athlete page: profile, latest sessions and recommendation
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetailResponse {
    pub user: User,
    pub training: AthleteTrainingSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub trainings: Vec<Training>,
}

/// Month view of trainings, one entry per calendar day
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}
