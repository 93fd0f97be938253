use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::MutexGuard;
use tracing::{debug, instrument};

use super::{MatchScoreRow, RecentTraining, StatsError, TeamScoreRow};
use crate::club::repository::{ClubTables, InMemoryClubRepository};

/// Read-only queries the statistics engine needs from the club store
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn team_exists(&self, team_id: i64) -> Result<bool, StatsError>;

    /// Age of the user, `None` when the user does not exist
    async fn athlete_age(&self, user_id: i64) -> Result<Option<i32>, StatsError>;

    /// The team's scores joined with match and competition
    async fn rows_for_team(&self, team_id: i64) -> Result<Vec<TeamScoreRow>, StatsError>;

    /// Scores of other teams in matches the team played
    async fn opposing_scores_for_team(
        &self,
        team_id: i64,
    ) -> Result<Vec<MatchScoreRow>, StatsError>;

    /// Ages of the team's current members
    async fn roster_for_team(&self, team_id: i64) -> Result<Vec<i32>, StatsError>;

    /// At most `limit` sessions, latest training first
    async fn recent_trainings_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<RecentTraining>, StatsError>;
}

impl InMemoryClubRepository {
    fn stats_tables(&self) -> Result<MutexGuard<'_, ClubTables>, StatsError> {
        self.tables()
            .map_err(|e| StatsError::Repository(e.to_string()))
    }
}

#[async_trait]
impl StatsRepository for InMemoryClubRepository {
    #[instrument(skip(self))]
    async fn team_exists(&self, team_id: i64) -> Result<bool, StatsError> {
        Ok(self.stats_tables()?.teams.contains_key(&team_id))
    }

    #[instrument(skip(self))]
    async fn athlete_age(&self, user_id: i64) -> Result<Option<i32>, StatsError> {
        Ok(self.stats_tables()?.users.get(&user_id).map(|u| u.age))
    }

    #[instrument(skip(self))]
    async fn rows_for_team(&self, team_id: i64) -> Result<Vec<TeamScoreRow>, StatsError> {
        let tables = self.stats_tables()?;

        let rows: Vec<TeamScoreRow> = tables
            .match_teams
            .values()
            .filter(|mt| mt.team_id == team_id)
            .filter_map(|mt| {
                let played = tables.matches.get(&mt.match_id)?;
                let competition = tables.competitions.get(&played.competition_id)?;
                Some(TeamScoreRow {
                    match_id: mt.match_id,
                    competition_id: competition.id,
                    competition_name: competition.name.clone(),
                    team_score: mt.team_score,
                })
            })
            .collect();

        debug!(team_id, row_count = rows.len(), "Loaded team score rows from memory");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn opposing_scores_for_team(
        &self,
        team_id: i64,
    ) -> Result<Vec<MatchScoreRow>, StatsError> {
        let tables = self.stats_tables()?;

        let played: BTreeSet<i64> = tables
            .match_teams
            .values()
            .filter(|mt| mt.team_id == team_id)
            .map(|mt| mt.match_id)
            .collect();

        Ok(tables
            .match_teams
            .values()
            .filter(|mt| mt.team_id != team_id && played.contains(&mt.match_id))
            .map(|mt| MatchScoreRow {
                match_id: mt.match_id,
                team_id: mt.team_id,
                team_score: mt.team_score,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn roster_for_team(&self, team_id: i64) -> Result<Vec<i32>, StatsError> {
        Ok(self
            .stats_tables()?
            .users
            .values()
            .filter(|u| u.team_id == Some(team_id))
            .map(|u| u.age)
            .collect())
    }

    #[instrument(skip(self))]
    async fn recent_trainings_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<RecentTraining>, StatsError> {
        let tables = self.stats_tables()?;

        let mut sessions: Vec<RecentTraining> = tables
            .user_trainings
            .values()
            .filter(|ut| ut.user_id == user_id)
            .filter_map(|ut| {
                let training = tables.trainings.get(&ut.training_id)?;
                Some(RecentTraining {
                    user_training_id: ut.id,
                    training_id: training.id,
                    datetime: training.datetime,
                    intensity: ut.intensity,
                })
            })
            .collect();

        sessions.sort_by_key(|s| Reverse((s.datetime, s.user_training_id)));
        sessions.truncate(limit);
        Ok(sessions)
    }
}
