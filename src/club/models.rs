use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use strum_macros::EnumIter;

/// Database model for teams table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub sport_type: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Competition {
    pub id: i64,
    pub name: String,
    pub prize_pool: Decimal,
    pub league: String,
    pub sport_type: String,
}

/// A single match, always belonging to one competition
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
    pub competition_id: i64,
}

/// One team's score in one match. At most one row per (match, team)
/// and at most two rows per match.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MatchTeam {
    pub id: i64,
    pub match_id: i64,
    pub team_id: i64,
    pub team_score: i32,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Sportsman,
    Coach,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sportsman => "sportsman",
            Role::Coach => "coach",
            Role::Admin => "admin",
        }
    }

    /// Coaches and admins may edit or remove training sessions
    pub fn can_manage_trainings(&self) -> bool {
        match self {
            Role::Coach | Role::Admin => true,
            Role::Sportsman => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sportsman" => Ok(Role::Sportsman),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            _ => Err(s.to_string()),
        }
    }
}

/// An athlete (or coach/admin) account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub team_id: Option<i64>,
    pub age: i32,
    pub gender: String,
    pub height: i32,
    pub weight: i32,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Training {
    pub id: i64,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
}

/// Enrollment of one athlete, wearing one sensor, in one training session
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserTraining {
    pub id: i64,
    pub user_id: i64,
    pub sensor_id: i64,
    pub training_id: i64,
    pub intensity: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Sensor {
    pub id: i64,
    pub heart_rate: i32,
}

// Insert payloads. Identifiers are assigned by the store.

#[derive(Debug, Clone, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub city: String,
    pub sport_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompetition {
    pub name: String,
    pub prize_pool: Decimal,
    pub league: String,
    pub sport_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
    pub competition_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatchTeam {
    pub match_id: i64,
    pub team_id: i64,
    pub team_score: i32,
}

/// One side of a match: the team and its final score
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TeamScore {
    pub team_id: i64,
    pub team_score: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    pub age: i32,
    pub gender: String,
    pub height: i32,
    pub weight: i32,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTraining {
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserTraining {
    pub user_id: i64,
    pub sensor_id: i64,
    pub training_id: i64,
    pub intensity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSensor {
    pub heart_rate: i32,
}
