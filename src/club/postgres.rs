use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, info, instrument, warn};

use super::models::{
    Competition, Match, MatchTeam, NewCompetition, NewMatch, NewMatchTeam, NewSensor, NewTeam,
    NewTraining, NewUser, NewUserTraining, Role, Sensor, Team, TeamScore, Training, User,
    UserTraining,
};
use super::repository::{not_found, ClubRepository, MatchTeamResult, MAX_TEAMS_PER_MATCH};
use crate::shared::AppError;
use crate::stats::{MatchScoreRow, RecentTraining, StatsError, StatsRepository, TeamScoreRow};

const MATCH_COLUMNS: &str = "id, datetime, location, duration_minutes, competition_id";
const USER_TRAINING_COLUMNS: &str = "id, user_id, sensor_id, training_id, intensity";
const USER_COLUMNS: &str =
    "id, email, first_name, team_id, age, gender, height, weight, role";

/// PostgreSQL implementation of the club store.
///
/// Cascading deletes and the unique (match, team) pair are enforced by the
/// schema in `migrations/`.
pub struct PostgresClubRepository {
    pool: PgPool,
}

impl PostgresClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(action: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "Failed to {} in database", action);
        AppError::DatabaseError(e.to_string())
    }
}

fn stats_error(action: &'static str) -> impl Fn(sqlx::Error) -> StatsError {
    move |e| {
        warn!(error = %e, "Failed to {} in database", action);
        StatsError::Repository(e.to_string())
    }
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn enrollment_error(user_id: i64, training_id: i64) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            warn!(user_id, training_id, "Athlete already enrolled in training");
            AppError::Validation(format!(
                "User {} is already enrolled in training {}",
                user_id, training_id
            ))
        } else if is_foreign_key_violation(&e) {
            warn!("Enrollment references unknown user, sensor or training");
            AppError::NotFound("User, sensor or training not found".to_string())
        } else {
            database_error("save user training")(e)
        }
    }
}

fn duplicate_email_error(email: &str) -> impl Fn(sqlx::Error) -> AppError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            warn!(email = %email, "User email already exists");
            AppError::Validation(format!("User with email {} already exists", email))
        } else if is_foreign_key_violation(&e) {
            AppError::NotFound("Team not found".to_string())
        } else {
            database_error("save user")(e)
        }
    }
}

/// Checks the competition and both teams inside the transaction, sharing the
/// team rows so they cannot be deleted before commit
async fn check_match_references(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    competition_id: i64,
    scores: &[TeamScore; 2],
) -> Result<(), AppError> {
    let competition: Option<i64> =
        sqlx::query_scalar("SELECT id FROM competitions WHERE id = $1 FOR SHARE")
            .bind(competition_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(database_error("check competition"))?;
    if competition.is_none() {
        return Err(not_found("Competition", competition_id));
    }

    let team_ids: Vec<i64> = scores.iter().map(|s| s.team_id).collect();
    let found: Vec<i64> = sqlx::query_scalar("SELECT id FROM teams WHERE id = ANY($1) FOR SHARE")
        .bind(&team_ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(database_error("check teams"))?;
    match team_ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(not_found("Team", *missing)),
        None => Ok(()),
    }
}

/// Writes both score rows for a match whose references were already checked
async fn put_scores(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    match_id: i64,
    scores: &[TeamScore; 2],
) -> Result<Vec<MatchTeam>, AppError> {
    let mut rows = Vec::with_capacity(scores.len());
    for score in scores {
        let row = sqlx::query_as::<_, MatchTeam>(
            "INSERT INTO match_teams (match_id, team_id, team_score) VALUES ($1, $2, $3) \
             ON CONFLICT (match_id, team_id) DO UPDATE SET team_score = EXCLUDED.team_score \
             RETURNING id, match_id, team_id, team_score",
        )
        .bind(match_id)
        .bind(score.team_id)
        .bind(score.team_score)
        .fetch_one(&mut **tx)
        .await
        .map_err(database_error("save match score"))?;
        rows.push(row);
    }
    Ok(rows)
}

fn user_from_row(row: &PgRow) -> Result<User, AppError> {
    let role: String = row.get("role");
    let role = Role::try_from(role.as_str()).map_err(|role| {
        warn!(role = %role, "Unknown role stored in database");
        AppError::DatabaseError(format!("Unknown role {}", role))
    })?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        team_id: row.get("team_id"),
        age: row.get("age"),
        gender: row.get("gender"),
        height: row.get("height"),
        weight: row.get("weight"),
        role,
    })
}

#[async_trait]
impl ClubRepository for PostgresClubRepository {
    #[instrument(skip(self, team))]
    async fn create_team(&self, team: &NewTeam) -> Result<Team, AppError> {
        let team = sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, city, sport_type) VALUES ($1, $2, $3) \
             RETURNING id, name, city, sport_type",
        )
        .bind(&team.name)
        .bind(&team.city)
        .bind(&team.sport_type)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create team"))?;

        debug!(team_id = team.id, "Team created in database");
        Ok(team)
    }

    #[instrument(skip(self))]
    async fn get_team(&self, team_id: i64) -> Result<Option<Team>, AppError> {
        sqlx::query_as::<_, Team>("SELECT id, name, city, sport_type FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("fetch team"))
    }

    #[instrument(skip(self))]
    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        sqlx::query_as::<_, Team>("SELECT id, name, city, sport_type FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("list teams"))
    }

    #[instrument(skip(self, team))]
    async fn update_team(&self, team: &Team) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE teams SET name = $2, city = $3, sport_type = $4 WHERE id = $1")
                .bind(team.id)
                .bind(&team.name)
                .bind(&team.city)
                .bind(&team.sport_type)
                .execute(&self.pool)
                .await
                .map_err(database_error("update team"))?;

        if result.rows_affected() == 0 {
            warn!(team_id = team.id, "Team not found for update");
            return Err(not_found("Team", team.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_team(&self, team_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete team"))?;

        if result.rows_affected() == 0 {
            warn!(team_id, "Team not found for deletion");
            return Err(not_found("Team", team_id));
        }
        info!(team_id, "Team deleted from database");
        Ok(())
    }

    #[instrument(skip(self, competition))]
    async fn create_competition(
        &self,
        competition: &NewCompetition,
    ) -> Result<Competition, AppError> {
        sqlx::query_as::<_, Competition>(
            "INSERT INTO competitions (name, prize_pool, league, sport_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, prize_pool, league, sport_type",
        )
        .bind(&competition.name)
        .bind(competition.prize_pool)
        .bind(&competition.league)
        .bind(&competition.sport_type)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create competition"))
    }

    #[instrument(skip(self))]
    async fn get_competition(
        &self,
        competition_id: i64,
    ) -> Result<Option<Competition>, AppError> {
        sqlx::query_as::<_, Competition>(
            "SELECT id, name, prize_pool, league, sport_type FROM competitions WHERE id = $1",
        )
        .bind(competition_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("fetch competition"))
    }

    #[instrument(skip(self))]
    async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        sqlx::query_as::<_, Competition>(
            "SELECT id, name, prize_pool, league, sport_type FROM competitions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list competitions"))
    }

    #[instrument(skip(self, competition))]
    async fn update_competition(&self, competition: &Competition) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE competitions SET name = $2, prize_pool = $3, league = $4, sport_type = $5 \
             WHERE id = $1",
        )
        .bind(competition.id)
        .bind(&competition.name)
        .bind(competition.prize_pool)
        .bind(&competition.league)
        .bind(&competition.sport_type)
        .execute(&self.pool)
        .await
        .map_err(database_error("update competition"))?;

        if result.rows_affected() == 0 {
            warn!(competition_id = competition.id, "Competition not found for update");
            return Err(not_found("Competition", competition.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_competition(&self, competition_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM competitions WHERE id = $1")
            .bind(competition_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete competition"))?;

        if result.rows_affected() == 0 {
            warn!(competition_id, "Competition not found for deletion");
            return Err(not_found("Competition", competition_id));
        }
        info!(competition_id, "Competition deleted from database");
        Ok(())
    }

    #[instrument(skip(self, new_match))]
    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, AppError> {
        sqlx::query_as::<_, Match>(
            "INSERT INTO matches (datetime, location, duration_minutes, competition_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, datetime, location, duration_minutes, competition_id",
        )
        .bind(new_match.datetime)
        .bind(&new_match.location)
        .bind(new_match.duration_minutes)
        .bind(new_match.competition_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                warn!(competition_id = new_match.competition_id, "Match references unknown competition");
                not_found("Competition", new_match.competition_id)
            } else {
                database_error("create match")(e)
            }
        })
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: i64) -> Result<Option<Match>, AppError> {
        sqlx::query_as::<_, Match>(
            "SELECT id, datetime, location, duration_minutes, competition_id \
             FROM matches WHERE id = $1",
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("fetch match"))
    }

    #[instrument(skip(self))]
    async fn list_matches(&self) -> Result<Vec<Match>, AppError> {
        sqlx::query_as::<_, Match>(
            "SELECT id, datetime, location, duration_minutes, competition_id \
             FROM matches ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list matches"))
    }

    #[instrument(skip(self))]
    async fn list_matches_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<Match>, AppError> {
        sqlx::query_as::<_, Match>(
            "SELECT id, datetime, location, duration_minutes, competition_id \
             FROM matches WHERE competition_id = $1 ORDER BY datetime, id",
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list competition matches"))
    }

    #[instrument(skip(self))]
    async fn delete_match(&self, match_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(match_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete match"))?;

        if result.rows_affected() == 0 {
            warn!(match_id, "Match not found for deletion");
            return Err(not_found("Match", match_id));
        }
        Ok(())
    }

    #[instrument(skip(self, new_match))]
    async fn create_match_with_scores(
        &self,
        new_match: &NewMatch,
        scores: &[TeamScore; 2],
    ) -> Result<(Match, Vec<MatchTeam>), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin transaction"))?;

        check_match_references(&mut tx, new_match.competition_id, scores).await?;

        let created = sqlx::query_as::<_, Match>(&format!(
            "INSERT INTO matches (datetime, location, duration_minutes, competition_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            MATCH_COLUMNS
        ))
        .bind(new_match.datetime)
        .bind(&new_match.location)
        .bind(new_match.duration_minutes)
        .bind(new_match.competition_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error("create match"))?;

        let teams = put_scores(&mut tx, created.id, scores).await?;

        tx.commit()
            .await
            .map_err(database_error("commit match"))?;

        debug!(match_id = created.id, "Match created with scores in database");
        Ok((created, teams))
    }

    #[instrument(skip(self, updated))]
    async fn update_match_with_scores(
        &self,
        updated: &Match,
        scores: &[TeamScore; 2],
    ) -> Result<Vec<MatchTeam>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin transaction"))?;

        let locked = sqlx::query("SELECT id FROM matches WHERE id = $1 FOR UPDATE")
            .bind(updated.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(database_error("lock match"))?;
        if locked.is_none() {
            warn!(match_id = updated.id, "Match not found for update");
            return Err(not_found("Match", updated.id));
        }
        check_match_references(&mut tx, updated.competition_id, scores).await?;

        sqlx::query(
            "UPDATE matches SET datetime = $2, location = $3, duration_minutes = $4, \
             competition_id = $5 WHERE id = $1",
        )
        .bind(updated.id)
        .bind(updated.datetime)
        .bind(&updated.location)
        .bind(updated.duration_minutes)
        .bind(updated.competition_id)
        .execute(&mut *tx)
        .await
        .map_err(database_error("update match"))?;

        let team_ids: Vec<i64> = scores.iter().map(|s| s.team_id).collect();
        sqlx::query("DELETE FROM match_teams WHERE match_id = $1 AND team_id <> ALL($2)")
            .bind(updated.id)
            .bind(&team_ids)
            .execute(&mut *tx)
            .await
            .map_err(database_error("drop replaced match teams"))?;

        let teams = put_scores(&mut tx, updated.id, scores).await?;

        tx.commit()
            .await
            .map_err(database_error("commit match"))?;

        debug!(match_id = updated.id, "Match updated with scores in database");
        Ok(teams)
    }

    #[instrument(skip(self))]
    async fn upsert_match_team(
        &self,
        match_team: &NewMatchTeam,
    ) -> Result<MatchTeamResult, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(database_error("begin transaction"))?;

        // Locking the match row serializes concurrent score writes for it
        let locked = sqlx::query("SELECT id FROM matches WHERE id = $1 FOR UPDATE")
            .bind(match_team.match_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(database_error("lock match"))?;
        if locked.is_none() {
            return Ok(MatchTeamResult::MatchNotFound);
        }

        let team_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE id = $1)")
                .bind(match_team.team_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(database_error("check team"))?;
        if !team_exists {
            return Ok(MatchTeamResult::TeamNotFound);
        }

        let recorded: Vec<i64> =
            sqlx::query_scalar("SELECT team_id FROM match_teams WHERE match_id = $1")
                .bind(match_team.match_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(database_error("fetch match teams"))?;
        if !recorded.contains(&match_team.team_id) && recorded.len() >= MAX_TEAMS_PER_MATCH {
            warn!(
                match_id = match_team.match_id,
                team_id = match_team.team_id,
                "Match already has two teams"
            );
            return Ok(MatchTeamResult::MatchFull);
        }

        let row = sqlx::query_as::<_, MatchTeam>(
            "INSERT INTO match_teams (match_id, team_id, team_score) VALUES ($1, $2, $3) \
             ON CONFLICT (match_id, team_id) DO UPDATE SET team_score = EXCLUDED.team_score \
             RETURNING id, match_id, team_id, team_score",
        )
        .bind(match_team.match_id)
        .bind(match_team.team_id)
        .bind(match_team.team_score)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error("upsert match team"))?;

        tx.commit()
            .await
            .map_err(database_error("commit match team"))?;

        debug!(
            match_id = row.match_id,
            team_id = row.team_id,
            team_score = row.team_score,
            "Match score saved in database"
        );
        Ok(MatchTeamResult::Saved(row))
    }

    #[instrument(skip(self))]
    async fn match_teams_for_match(&self, match_id: i64) -> Result<Vec<MatchTeam>, AppError> {
        sqlx::query_as::<_, MatchTeam>(
            "SELECT id, match_id, team_id, team_score FROM match_teams \
             WHERE match_id = $1 ORDER BY id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("fetch match teams"))
    }

    #[instrument(skip(self))]
    async fn list_match_teams(&self) -> Result<Vec<MatchTeam>, AppError> {
        sqlx::query_as::<_, MatchTeam>(
            "SELECT id, match_id, team_id, team_score FROM match_teams ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list match teams"))
    }

    #[instrument(skip(self))]
    async fn get_match_team(&self, match_team_id: i64) -> Result<Option<MatchTeam>, AppError> {
        sqlx::query_as::<_, MatchTeam>(
            "SELECT id, match_id, team_id, team_score FROM match_teams WHERE id = $1",
        )
        .bind(match_team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("fetch match team"))
    }

    #[instrument(skip(self))]
    async fn delete_match_team(&self, match_team_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM match_teams WHERE id = $1")
            .bind(match_team_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete match team"))?;

        if result.rows_affected() == 0 {
            warn!(match_team_id, "Match score not found for deletion");
            return Err(not_found("Match team", match_team_id));
        }
        Ok(())
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (email, first_name, team_id, age, gender, height, weight, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(user.team_id)
        .bind(user.age)
        .bind(&user.gender)
        .bind(user.height)
        .bind(user.weight)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email_error(&user.email))?;

        user_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("fetch user"))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("list users"))?;

        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, first_name = $3, team_id = $4, age = $5, \
             gender = $6, height = $7, weight = $8, role = $9 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(user.team_id)
        .bind(user.age)
        .bind(&user.gender)
        .bind(user.height)
        .bind(user.weight)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(duplicate_email_error(&user.email))?;

        if result.rows_affected() == 0 {
            warn!(user_id = user.id, "User not found for update");
            return Err(not_found("User", user.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete user"))?;

        if result.rows_affected() == 0 {
            warn!(user_id, "User not found for deletion");
            return Err(not_found("User", user_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_sensor(&self, sensor: &NewSensor) -> Result<Sensor, AppError> {
        sqlx::query_as::<_, Sensor>(
            "INSERT INTO sensors (heart_rate) VALUES ($1) RETURNING id, heart_rate",
        )
        .bind(sensor.heart_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create sensor"))
    }

    #[instrument(skip(self))]
    async fn get_sensor(&self, sensor_id: i64) -> Result<Option<Sensor>, AppError> {
        sqlx::query_as::<_, Sensor>("SELECT id, heart_rate FROM sensors WHERE id = $1")
            .bind(sensor_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error("fetch sensor"))
    }

    #[instrument(skip(self))]
    async fn list_sensors(&self) -> Result<Vec<Sensor>, AppError> {
        sqlx::query_as::<_, Sensor>("SELECT id, heart_rate FROM sensors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("list sensors"))
    }

    #[instrument(skip(self))]
    async fn update_sensor(&self, sensor: &Sensor) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sensors SET heart_rate = $2 WHERE id = $1")
            .bind(sensor.id)
            .bind(sensor.heart_rate)
            .execute(&self.pool)
            .await
            .map_err(database_error("update sensor"))?;

        if result.rows_affected() == 0 {
            warn!(sensor_id = sensor.id, "Sensor not found for update");
            return Err(not_found("Sensor", sensor.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_sensor(&self, sensor_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sensors WHERE id = $1")
            .bind(sensor_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete sensor"))?;

        if result.rows_affected() == 0 {
            warn!(sensor_id, "Sensor not found for deletion");
            return Err(not_found("Sensor", sensor_id));
        }
        info!(sensor_id, "Sensor deleted from database");
        Ok(())
    }

    #[instrument(skip(self, training))]
    async fn create_training(&self, training: &NewTraining) -> Result<Training, AppError> {
        sqlx::query_as::<_, Training>(
            "INSERT INTO trainings (datetime, location, duration_minutes) VALUES ($1, $2, $3) \
             RETURNING id, datetime, location, duration_minutes",
        )
        .bind(training.datetime)
        .bind(&training.location)
        .bind(training.duration_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create training"))
    }

    #[instrument(skip(self))]
    async fn get_training(&self, training_id: i64) -> Result<Option<Training>, AppError> {
        sqlx::query_as::<_, Training>(
            "SELECT id, datetime, location, duration_minutes FROM trainings WHERE id = $1",
        )
        .bind(training_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("fetch training"))
    }

    #[instrument(skip(self))]
    async fn list_trainings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError> {
        sqlx::query_as::<_, Training>(
            "SELECT id, datetime, location, duration_minutes FROM trainings \
             WHERE datetime >= $1 AND datetime < $2 ORDER BY datetime, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list trainings"))
    }

    #[instrument(skip(self, training))]
    async fn update_training(&self, training: &Training) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE trainings SET datetime = $2, location = $3, duration_minutes = $4 \
             WHERE id = $1",
        )
        .bind(training.id)
        .bind(training.datetime)
        .bind(&training.location)
        .bind(training.duration_minutes)
        .execute(&self.pool)
        .await
        .map_err(database_error("update training"))?;

        if result.rows_affected() == 0 {
            warn!(training_id = training.id, "Training not found for update");
            return Err(not_found("Training", training.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_training(&self, training_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(training_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete training"))?;

        if result.rows_affected() == 0 {
            warn!(training_id, "Training not found for deletion");
            return Err(not_found("Training", training_id));
        }
        info!(training_id, "Training deleted from database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_user_training(
        &self,
        user_training: &NewUserTraining,
    ) -> Result<UserTraining, AppError> {
        sqlx::query_as::<_, UserTraining>(&format!(
            "INSERT INTO user_trainings (user_id, sensor_id, training_id, intensity) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_TRAINING_COLUMNS
        ))
        .bind(user_training.user_id)
        .bind(user_training.sensor_id)
        .bind(user_training.training_id)
        .bind(user_training.intensity)
        .fetch_one(&self.pool)
        .await
        .map_err(enrollment_error(user_training.user_id, user_training.training_id))
    }

    #[instrument(skip(self))]
    async fn user_trainings_for_training(
        &self,
        training_id: i64,
    ) -> Result<Vec<UserTraining>, AppError> {
        sqlx::query_as::<_, UserTraining>(
            "SELECT id, user_id, sensor_id, training_id, intensity FROM user_trainings \
             WHERE training_id = $1 ORDER BY id",
        )
        .bind(training_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("fetch user trainings"))
    }

    #[instrument(skip(self))]
    async fn list_user_trainings(&self) -> Result<Vec<UserTraining>, AppError> {
        sqlx::query_as::<_, UserTraining>(&format!(
            "SELECT {} FROM user_trainings ORDER BY id",
            USER_TRAINING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list user trainings"))
    }

    #[instrument(skip(self))]
    async fn get_user_training(
        &self,
        user_training_id: i64,
    ) -> Result<Option<UserTraining>, AppError> {
        sqlx::query_as::<_, UserTraining>(&format!(
            "SELECT {} FROM user_trainings WHERE id = $1",
            USER_TRAINING_COLUMNS
        ))
        .bind(user_training_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("fetch user training"))
    }

    #[instrument(skip(self))]
    async fn update_user_training(&self, user_training: &UserTraining) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE user_trainings SET user_id = $2, sensor_id = $3, training_id = $4, \
             intensity = $5 WHERE id = $1",
        )
        .bind(user_training.id)
        .bind(user_training.user_id)
        .bind(user_training.sensor_id)
        .bind(user_training.training_id)
        .bind(user_training.intensity)
        .execute(&self.pool)
        .await
        .map_err(enrollment_error(user_training.user_id, user_training.training_id))?;

        if result.rows_affected() == 0 {
            warn!(user_training_id = user_training.id, "Enrollment not found for update");
            return Err(not_found("User training", user_training.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_user_training(&self, user_training_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM user_trainings WHERE id = $1")
            .bind(user_training_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete user training"))?;

        if result.rows_affected() == 0 {
            warn!(user_training_id, "Enrollment not found for deletion");
            return Err(not_found("User training", user_training_id));
        }
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for PostgresClubRepository {
    #[instrument(skip(self))]
    async fn team_exists(&self, team_id: i64) -> Result<bool, StatsError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE id = $1)")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await
            .map_err(stats_error("check team"))
    }

    #[instrument(skip(self))]
    async fn athlete_age(&self, user_id: i64) -> Result<Option<i32>, StatsError> {
        sqlx::query_scalar("SELECT age FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(stats_error("fetch athlete age"))
    }

    #[instrument(skip(self))]
    async fn rows_for_team(&self, team_id: i64) -> Result<Vec<TeamScoreRow>, StatsError> {
        let rows = sqlx::query_as::<_, TeamScoreRow>(
            "SELECT mt.match_id, c.id AS competition_id, c.name AS competition_name, mt.team_score \
             FROM match_teams mt \
             JOIN matches m ON m.id = mt.match_id \
             JOIN competitions c ON c.id = m.competition_id \
             WHERE mt.team_id = $1",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(stats_error("fetch team score rows"))?;

        debug!(team_id, row_count = rows.len(), "Loaded team score rows from database");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn opposing_scores_for_team(
        &self,
        team_id: i64,
    ) -> Result<Vec<MatchScoreRow>, StatsError> {
        sqlx::query_as::<_, MatchScoreRow>(
            "SELECT other.match_id, other.team_id, other.team_score \
             FROM match_teams own \
             JOIN match_teams other \
               ON other.match_id = own.match_id AND other.team_id <> own.team_id \
             WHERE own.team_id = $1",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(stats_error("fetch opposing scores"))
    }

    #[instrument(skip(self))]
    async fn roster_for_team(&self, team_id: i64) -> Result<Vec<i32>, StatsError> {
        sqlx::query_scalar("SELECT age FROM users WHERE team_id = $1")
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(stats_error("fetch roster"))
    }

    #[instrument(skip(self))]
    async fn recent_trainings_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<RecentTraining>, StatsError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        sqlx::query_as::<_, RecentTraining>(
            "SELECT ut.id AS user_training_id, t.id AS training_id, t.datetime, ut.intensity \
             FROM user_trainings ut \
             JOIN trainings t ON t.id = ut.training_id \
             WHERE ut.user_id = $1 \
             ORDER BY t.datetime DESC, ut.id DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(stats_error("fetch recent trainings"))
    }
}
