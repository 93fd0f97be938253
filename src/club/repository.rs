use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::models::{
    Competition, Match, MatchTeam, NewCompetition, NewMatch, NewMatchTeam, NewSensor, NewTeam,
    NewTraining, NewUser, NewUserTraining, Sensor, Team, TeamScore, Training, User,
    UserTraining,
};
use crate::shared::AppError;

/// Teams a single match can hold
pub const MAX_TEAMS_PER_MATCH: usize = 2;

/// Result of attempting to record a team's score for a match
#[derive(Debug, Clone, PartialEq)]
pub enum MatchTeamResult {
    /// Row inserted, or the existing (match, team) row had its score replaced
    Saved(MatchTeam),
    /// The match already has two other teams
    MatchFull,
    MatchNotFound,
    TeamNotFound,
}

/// Trait for the club's CRUD operations
#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn create_team(&self, team: &NewTeam) -> Result<Team, AppError>;
    async fn get_team(&self, team_id: i64) -> Result<Option<Team>, AppError>;
    async fn list_teams(&self) -> Result<Vec<Team>, AppError>;
    async fn update_team(&self, team: &Team) -> Result<(), AppError>;
    /// Removes the team and its match rows; roster members are detached
    async fn delete_team(&self, team_id: i64) -> Result<(), AppError>;

    async fn create_competition(
        &self,
        competition: &NewCompetition,
    ) -> Result<Competition, AppError>;
    async fn get_competition(&self, competition_id: i64)
        -> Result<Option<Competition>, AppError>;
    async fn list_competitions(&self) -> Result<Vec<Competition>, AppError>;
    async fn update_competition(&self, competition: &Competition) -> Result<(), AppError>;
    /// Removes the competition together with its matches
    async fn delete_competition(&self, competition_id: i64) -> Result<(), AppError>;

    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, AppError>;
    async fn get_match(&self, match_id: i64) -> Result<Option<Match>, AppError>;
    async fn list_matches(&self) -> Result<Vec<Match>, AppError>;
    async fn list_matches_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<Match>, AppError>;
    async fn delete_match(&self, match_id: i64) -> Result<(), AppError>;

    /// Stores the match together with both teams' scores, or nothing at all
    /// when the competition or a team is missing
    async fn create_match_with_scores(
        &self,
        new_match: &NewMatch,
        scores: &[TeamScore; 2],
    ) -> Result<(Match, Vec<MatchTeam>), AppError>;
    /// Replaces the match fields and its pair of teams in one step; rows of
    /// teams outside the new pair are dropped
    async fn update_match_with_scores(
        &self,
        updated: &Match,
        scores: &[TeamScore; 2],
    ) -> Result<Vec<MatchTeam>, AppError>;

    /// Atomically inserts or replaces the score of a team in a match,
    /// refusing a third distinct team
    async fn upsert_match_team(
        &self,
        match_team: &NewMatchTeam,
    ) -> Result<MatchTeamResult, AppError>;
    async fn match_teams_for_match(&self, match_id: i64) -> Result<Vec<MatchTeam>, AppError>;
    async fn list_match_teams(&self) -> Result<Vec<MatchTeam>, AppError>;
    async fn get_match_team(&self, match_team_id: i64) -> Result<Option<MatchTeam>, AppError>;
    async fn delete_match_team(&self, match_team_id: i64) -> Result<(), AppError>;

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn update_user(&self, user: &User) -> Result<(), AppError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError>;

    async fn create_sensor(&self, sensor: &NewSensor) -> Result<Sensor, AppError>;
    async fn get_sensor(&self, sensor_id: i64) -> Result<Option<Sensor>, AppError>;
    async fn list_sensors(&self) -> Result<Vec<Sensor>, AppError>;
    async fn update_sensor(&self, sensor: &Sensor) -> Result<(), AppError>;
    /// Removes the sensor and the enrollments that used it
    async fn delete_sensor(&self, sensor_id: i64) -> Result<(), AppError>;

    async fn create_training(&self, training: &NewTraining) -> Result<Training, AppError>;
    async fn get_training(&self, training_id: i64) -> Result<Option<Training>, AppError>;
    /// Trainings with `start <= datetime < end`, earliest first
    async fn list_trainings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError>;
    async fn update_training(&self, training: &Training) -> Result<(), AppError>;
    async fn delete_training(&self, training_id: i64) -> Result<(), AppError>;

    /// Enrolls an athlete; a second row for the same (user, training) pair
    /// is a validation error
    async fn create_user_training(
        &self,
        user_training: &NewUserTraining,
    ) -> Result<UserTraining, AppError>;
    async fn user_trainings_for_training(
        &self,
        training_id: i64,
    ) -> Result<Vec<UserTraining>, AppError>;
    async fn list_user_trainings(&self) -> Result<Vec<UserTraining>, AppError>;
    async fn get_user_training(
        &self,
        user_training_id: i64,
    ) -> Result<Option<UserTraining>, AppError>;
    /// Same pairing rule as [`ClubRepository::create_user_training`]
    async fn update_user_training(&self, user_training: &UserTraining) -> Result<(), AppError>;
    async fn delete_user_training(&self, user_training_id: i64) -> Result<(), AppError>;
}

/// Table storage behind [`InMemoryClubRepository`]
#[derive(Debug, Default)]
pub(crate) struct ClubTables {
    last_id: i64,
    pub(crate) teams: BTreeMap<i64, Team>,
    pub(crate) competitions: BTreeMap<i64, Competition>,
    pub(crate) matches: BTreeMap<i64, Match>,
    pub(crate) match_teams: BTreeMap<i64, MatchTeam>,
    pub(crate) users: BTreeMap<i64, User>,
    pub(crate) sensors: BTreeMap<i64, Sensor>,
    pub(crate) trainings: BTreeMap<i64, Training>,
    pub(crate) user_trainings: BTreeMap<i64, UserTraining>,
}

impl ClubTables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove_match_cascade(&mut self, match_id: i64) {
        self.matches.remove(&match_id);
        self.match_teams.retain(|_, mt| mt.match_id != match_id);
    }

    /// Both the competition and the two teams must exist
    fn check_match_references(
        &self,
        competition_id: i64,
        scores: &[TeamScore; 2],
    ) -> Result<(), AppError> {
        if !self.competitions.contains_key(&competition_id) {
            return Err(not_found("Competition", competition_id));
        }
        match scores.iter().find(|s| !self.teams.contains_key(&s.team_id)) {
            Some(missing) => Err(not_found("Team", missing.team_id)),
            None => Ok(()),
        }
    }

    /// Inserts or replaces the row of one team, without the two-team check
    fn put_match_team(&mut self, match_id: i64, score: &TeamScore) -> MatchTeam {
        let existing = self
            .match_teams
            .values()
            .find(|mt| mt.match_id == match_id && mt.team_id == score.team_id)
            .map(|mt| mt.id);
        let id = match existing {
            Some(id) => id,
            None => self.next_id(),
        };
        let row = MatchTeam {
            id,
            match_id,
            team_id: score.team_id,
            team_score: score.team_score,
        };
        self.match_teams.insert(id, row.clone());
        row
    }

    /// Another row, apart from `except`, already pairs this user and training
    fn is_enrolled(&self, user_id: i64, training_id: i64, except: Option<i64>) -> bool {
        self.user_trainings.values().any(|ut| {
            ut.user_id == user_id && ut.training_id == training_id && Some(ut.id) != except
        })
    }
}

fn already_enrolled(user_id: i64, training_id: i64) -> AppError {
    AppError::Validation(format!(
        "User {} is already enrolled in training {}",
        user_id, training_id
    ))
}

/// In-memory implementation of the club store for development and testing.
///
/// Data lives for the lifetime of the process. It also serves the statistics
/// queries, see `stats::repository`.
pub struct InMemoryClubRepository {
    tables: Mutex<ClubTables>,
}

impl Default for InMemoryClubRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClubRepository {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(ClubTables::default()),
        }
    }

    pub(crate) fn tables(&self) -> Result<MutexGuard<'_, ClubTables>, AppError> {
        self.tables.lock().map_err(|_| {
            warn!("In-memory club store lock poisoned");
            AppError::Internal
        })
    }
}

pub(crate) fn not_found(entity: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} {} not found", entity, id))
}

#[async_trait]
impl ClubRepository for InMemoryClubRepository {
    #[instrument(skip(self, team))]
    async fn create_team(&self, team: &NewTeam) -> Result<Team, AppError> {
        let mut tables = self.tables()?;
        let id = tables.next_id();
        let team = Team {
            id,
            name: team.name.clone(),
            city: team.city.clone(),
            sport_type: team.sport_type.clone(),
        };
        tables.teams.insert(id, team.clone());

        debug!(team_id = id, name = %team.name, "Team created in memory");
        Ok(team)
    }

    #[instrument(skip(self))]
    async fn get_team(&self, team_id: i64) -> Result<Option<Team>, AppError> {
        Ok(self.tables()?.teams.get(&team_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        Ok(self.tables()?.teams.values().cloned().collect())
    }

    #[instrument(skip(self, team))]
    async fn update_team(&self, team: &Team) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        match tables.teams.get_mut(&team.id) {
            Some(existing) => {
                *existing = team.clone();
                debug!(team_id = team.id, "Team updated in memory");
                Ok(())
            }
            None => {
                warn!(team_id = team.id, "Team not found for update in memory");
                Err(not_found("Team", team.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_team(&self, team_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.teams.remove(&team_id).is_none() {
            warn!(team_id, "Team not found for deletion in memory");
            return Err(not_found("Team", team_id));
        }

        tables.match_teams.retain(|_, mt| mt.team_id != team_id);
        for user in tables.users.values_mut() {
            if user.team_id == Some(team_id) {
                user.team_id = None;
            }
        }

        info!(team_id, "Team deleted from memory");
        Ok(())
    }

    #[instrument(skip(self, competition))]
    async fn create_competition(
        &self,
        competition: &NewCompetition,
    ) -> Result<Competition, AppError> {
        let mut tables = self.tables()?;
        let id = tables.next_id();
        let competition = Competition {
            id,
            name: competition.name.clone(),
            prize_pool: competition.prize_pool,
            league: competition.league.clone(),
            sport_type: competition.sport_type.clone(),
        };
        tables.competitions.insert(id, competition.clone());

        debug!(competition_id = id, name = %competition.name, "Competition created in memory");
        Ok(competition)
    }

    #[instrument(skip(self))]
    async fn get_competition(
        &self,
        competition_id: i64,
    ) -> Result<Option<Competition>, AppError> {
        Ok(self.tables()?.competitions.get(&competition_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        Ok(self.tables()?.competitions.values().cloned().collect())
    }

    #[instrument(skip(self, competition))]
    async fn update_competition(&self, competition: &Competition) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        match tables.competitions.get_mut(&competition.id) {
            Some(existing) => {
                *existing = competition.clone();
                debug!(competition_id = competition.id, "Competition updated in memory");
                Ok(())
            }
            None => {
                warn!(competition_id = competition.id, "Competition not found for update in memory");
                Err(not_found("Competition", competition.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_competition(&self, competition_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.competitions.remove(&competition_id).is_none() {
            warn!(competition_id, "Competition not found for deletion in memory");
            return Err(not_found("Competition", competition_id));
        }

        let match_ids: Vec<i64> = tables
            .matches
            .values()
            .filter(|m| m.competition_id == competition_id)
            .map(|m| m.id)
            .collect();
        for match_id in &match_ids {
            tables.remove_match_cascade(*match_id);
        }

        info!(
            competition_id,
            removed_matches = match_ids.len(),
            "Competition deleted from memory"
        );
        Ok(())
    }

    #[instrument(skip(self, new_match))]
    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, AppError> {
        let mut tables = self.tables()?;
        if !tables.competitions.contains_key(&new_match.competition_id) {
            return Err(not_found("Competition", new_match.competition_id));
        }

        let id = tables.next_id();
        let created = Match {
            id,
            datetime: new_match.datetime,
            location: new_match.location.clone(),
            duration_minutes: new_match.duration_minutes,
            competition_id: new_match.competition_id,
        };
        tables.matches.insert(id, created.clone());

        debug!(match_id = id, competition_id = created.competition_id, "Match created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: i64) -> Result<Option<Match>, AppError> {
        Ok(self.tables()?.matches.get(&match_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_matches(&self) -> Result<Vec<Match>, AppError> {
        Ok(self.tables()?.matches.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn list_matches_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<Match>, AppError> {
        Ok(self
            .tables()?
            .matches
            .values()
            .filter(|m| m.competition_id == competition_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_match(&self, match_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if !tables.matches.contains_key(&match_id) {
            warn!(match_id, "Match not found for deletion in memory");
            return Err(not_found("Match", match_id));
        }
        tables.remove_match_cascade(match_id);

        info!(match_id, "Match deleted from memory");
        Ok(())
    }

    #[instrument(skip(self, new_match))]
    async fn create_match_with_scores(
        &self,
        new_match: &NewMatch,
        scores: &[TeamScore; 2],
    ) -> Result<(Match, Vec<MatchTeam>), AppError> {
        let mut tables = self.tables()?;
        tables.check_match_references(new_match.competition_id, scores)?;

        let id = tables.next_id();
        let created = Match {
            id,
            datetime: new_match.datetime,
            location: new_match.location.clone(),
            duration_minutes: new_match.duration_minutes,
            competition_id: new_match.competition_id,
        };
        tables.matches.insert(id, created.clone());
        let teams = scores
            .iter()
            .map(|score| tables.put_match_team(id, score))
            .collect();

        debug!(match_id = id, competition_id = created.competition_id, "Match created with scores in memory");
        Ok((created, teams))
    }

    #[instrument(skip(self, updated))]
    async fn update_match_with_scores(
        &self,
        updated: &Match,
        scores: &[TeamScore; 2],
    ) -> Result<Vec<MatchTeam>, AppError> {
        let mut tables = self.tables()?;
        if !tables.matches.contains_key(&updated.id) {
            warn!(match_id = updated.id, "Match not found for update in memory");
            return Err(not_found("Match", updated.id));
        }
        tables.check_match_references(updated.competition_id, scores)?;

        tables.matches.insert(updated.id, updated.clone());
        tables.match_teams.retain(|_, mt| {
            mt.match_id != updated.id || scores.iter().any(|s| s.team_id == mt.team_id)
        });
        let teams = scores
            .iter()
            .map(|score| tables.put_match_team(updated.id, score))
            .collect();

        debug!(match_id = updated.id, "Match updated with scores in memory");
        Ok(teams)
    }

    #[instrument(skip(self, match_team))]
    async fn upsert_match_team(
        &self,
        match_team: &NewMatchTeam,
    ) -> Result<MatchTeamResult, AppError> {
        let mut tables = self.tables()?;

        if !tables.matches.contains_key(&match_team.match_id) {
            debug!(match_id = match_team.match_id, "Match not found");
            return Ok(MatchTeamResult::MatchNotFound);
        }
        if !tables.teams.contains_key(&match_team.team_id) {
            debug!(team_id = match_team.team_id, "Team not found");
            return Ok(MatchTeamResult::TeamNotFound);
        }

        let existing: Vec<MatchTeam> = tables
            .match_teams
            .values()
            .filter(|mt| mt.match_id == match_team.match_id)
            .cloned()
            .collect();

        if let Some(row) = existing.iter().find(|mt| mt.team_id == match_team.team_id) {
            let updated = MatchTeam {
                team_score: match_team.team_score,
                ..row.clone()
            };
            tables.match_teams.insert(updated.id, updated.clone());
            debug!(match_team_id = updated.id, "Match score replaced in memory");
            return Ok(MatchTeamResult::Saved(updated));
        }

        if existing.len() >= MAX_TEAMS_PER_MATCH {
            debug!(match_id = match_team.match_id, "Match already has two teams");
            return Ok(MatchTeamResult::MatchFull);
        }

        let id = tables.next_id();
        let created = MatchTeam {
            id,
            match_id: match_team.match_id,
            team_id: match_team.team_id,
            team_score: match_team.team_score,
        };
        tables.match_teams.insert(id, created.clone());

        debug!(
            match_team_id = id,
            match_id = created.match_id,
            team_id = created.team_id,
            "Match score recorded in memory"
        );
        Ok(MatchTeamResult::Saved(created))
    }

    #[instrument(skip(self))]
    async fn match_teams_for_match(&self, match_id: i64) -> Result<Vec<MatchTeam>, AppError> {
        Ok(self
            .tables()?
            .match_teams
            .values()
            .filter(|mt| mt.match_id == match_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_match_teams(&self) -> Result<Vec<MatchTeam>, AppError> {
        Ok(self.tables()?.match_teams.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_match_team(&self, match_team_id: i64) -> Result<Option<MatchTeam>, AppError> {
        Ok(self.tables()?.match_teams.get(&match_team_id).cloned())
    }

    #[instrument(skip(self))]
    async fn delete_match_team(&self, match_team_id: i64) -> Result<(), AppError> {
        if self.tables()?.match_teams.remove(&match_team_id).is_none() {
            warn!(match_team_id, "Match score not found for deletion in memory");
            return Err(not_found("Match team", match_team_id));
        }
        Ok(())
    }

    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "User email already exists in memory");
            return Err(AppError::Validation(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        let id = tables.next_id();
        let created = User {
            id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            team_id: user.team_id,
            age: user.age,
            gender: user.gender.clone(),
            height: user.height,
            weight: user.weight,
            role: user.role,
        };
        tables.users.insert(id, created.clone());

        debug!(user_id = id, role = %created.role, "User created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables()?.users.values().cloned().collect())
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&user.id) {
            warn!(user_id = user.id, "User not found for update in memory");
            return Err(not_found("User", user.id));
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            warn!(email = %user.email, "User email already exists in memory");
            return Err(AppError::Validation(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        tables.users.insert(user.id, user.clone());
        debug!(user_id = user.id, "User updated in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.users.remove(&user_id).is_none() {
            warn!(user_id, "User not found for deletion in memory");
            return Err(not_found("User", user_id));
        }
        tables.user_trainings.retain(|_, ut| ut.user_id != user_id);

        info!(user_id, "User deleted from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_sensor(&self, sensor: &NewSensor) -> Result<Sensor, AppError> {
        let mut tables = self.tables()?;
        let id = tables.next_id();
        let created = Sensor {
            id,
            heart_rate: sensor.heart_rate,
        };
        tables.sensors.insert(id, created.clone());
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_sensor(&self, sensor_id: i64) -> Result<Option<Sensor>, AppError> {
        Ok(self.tables()?.sensors.get(&sensor_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_sensors(&self) -> Result<Vec<Sensor>, AppError> {
        Ok(self.tables()?.sensors.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn update_sensor(&self, sensor: &Sensor) -> Result<(), AppError> {
        match self.tables()?.sensors.get_mut(&sensor.id) {
            Some(existing) => {
                *existing = sensor.clone();
                Ok(())
            }
            None => {
                warn!(sensor_id = sensor.id, "Sensor not found for update in memory");
                Err(not_found("Sensor", sensor.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_sensor(&self, sensor_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.sensors.remove(&sensor_id).is_none() {
            warn!(sensor_id, "Sensor not found for deletion in memory");
            return Err(not_found("Sensor", sensor_id));
        }
        tables.user_trainings.retain(|_, ut| ut.sensor_id != sensor_id);

        info!(sensor_id, "Sensor deleted from memory");
        Ok(())
    }

    #[instrument(skip(self, training))]
    async fn create_training(&self, training: &NewTraining) -> Result<Training, AppError> {
        let mut tables = self.tables()?;
        let id = tables.next_id();
        let created = Training {
            id,
            datetime: training.datetime,
            location: training.location.clone(),
            duration_minutes: training.duration_minutes,
        };
        tables.trainings.insert(id, created.clone());

        debug!(training_id = id, "Training created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_training(&self, training_id: i64) -> Result<Option<Training>, AppError> {
        Ok(self.tables()?.trainings.get(&training_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_trainings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError> {
        let mut trainings: Vec<Training> = self
            .tables()?
            .trainings
            .values()
            .filter(|t| t.datetime >= start && t.datetime < end)
            .cloned()
            .collect();
        trainings.sort_by_key(|t| (t.datetime, t.id));
        Ok(trainings)
    }

    #[instrument(skip(self, training))]
    async fn update_training(&self, training: &Training) -> Result<(), AppError> {
        match self.tables()?.trainings.get_mut(&training.id) {
            Some(existing) => {
                *existing = training.clone();
                debug!(training_id = training.id, "Training updated in memory");
                Ok(())
            }
            None => {
                warn!(training_id = training.id, "Training not found for update in memory");
                Err(not_found("Training", training.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_training(&self, training_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.trainings.remove(&training_id).is_none() {
            warn!(training_id, "Training not found for deletion in memory");
            return Err(not_found("Training", training_id));
        }
        tables
            .user_trainings
            .retain(|_, ut| ut.training_id != training_id);

        info!(training_id, "Training deleted from memory");
        Ok(())
    }

    #[instrument(skip(self, user_training))]
    async fn create_user_training(
        &self,
        user_training: &NewUserTraining,
    ) -> Result<UserTraining, AppError> {
        let mut tables = self.tables()?;
        if tables.is_enrolled(user_training.user_id, user_training.training_id, None) {
            warn!(
                user_id = user_training.user_id,
                training_id = user_training.training_id,
                "Athlete already enrolled in training in memory"
            );
            return Err(already_enrolled(
                user_training.user_id,
                user_training.training_id,
            ));
        }

        let id = tables.next_id();
        let created = UserTraining {
            id,
            user_id: user_training.user_id,
            sensor_id: user_training.sensor_id,
            training_id: user_training.training_id,
            intensity: user_training.intensity,
        };
        tables.user_trainings.insert(id, created.clone());

        debug!(
            user_training_id = id,
            user_id = created.user_id,
            training_id = created.training_id,
            "Athlete enrolled in training in memory"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn user_trainings_for_training(
        &self,
        training_id: i64,
    ) -> Result<Vec<UserTraining>, AppError> {
        Ok(self
            .tables()?
            .user_trainings
            .values()
            .filter(|ut| ut.training_id == training_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_user_trainings(&self) -> Result<Vec<UserTraining>, AppError> {
        Ok(self.tables()?.user_trainings.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn get_user_training(
        &self,
        user_training_id: i64,
    ) -> Result<Option<UserTraining>, AppError> {
        Ok(self.tables()?.user_trainings.get(&user_training_id).cloned())
    }

    #[instrument(skip(self))]
    async fn update_user_training(&self, user_training: &UserTraining) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if !tables.user_trainings.contains_key(&user_training.id) {
            warn!(user_training_id = user_training.id, "Enrollment not found for update in memory");
            return Err(not_found("User training", user_training.id));
        }
        if tables.is_enrolled(
            user_training.user_id,
            user_training.training_id,
            Some(user_training.id),
        ) {
            return Err(already_enrolled(
                user_training.user_id,
                user_training.training_id,
            ));
        }

        tables
            .user_trainings
            .insert(user_training.id, user_training.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user_training(&self, user_training_id: i64) -> Result<(), AppError> {
        if self
            .tables()?
            .user_trainings
            .remove(&user_training_id)
            .is_none()
        {
            warn!(user_training_id, "Enrollment not found for deletion in memory");
            return Err(not_found("User training", user_training_id));
        }
        Ok(())
    }
}
