use chrono::{Datelike, Months, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{
        Competition, Match, MatchTeam, NewCompetition, NewMatch, NewMatchTeam, NewSensor,
        NewTeam, NewTraining, NewUser, NewUserTraining, Role, Sensor, Team, Training, User,
        UserTraining,
    },
    repository::{not_found, ClubRepository, MatchTeamResult},
    types::{
        CalendarDay, CalendarResponse, CompetitionDetailResponse, CreateTrainingRequest,
        MatchDetailResponse, MatchRequest, MatchResult, TrainingResponse,
    },
};
use crate::shared::AppError;

fn ensure(condition: bool, message: &str) -> Result<(), AppError> {
    if condition {
        Ok(())
    } else {
        Err(AppError::Validation(message.to_string()))
    }
}

/// Service for the club's CRUD business logic
pub struct ClubService {
    repository: Arc<dyn ClubRepository>,
}

impl ClubService {
    pub fn new(repository: Arc<dyn ClubRepository>) -> Self {
        Self { repository }
    }

    // Teams

    #[instrument(skip(self, team))]
    pub async fn create_team(&self, team: NewTeam) -> Result<Team, AppError> {
        validate_team(&team)?;
        let team = self.repository.create_team(&team).await?;
        info!(team_id = team.id, name = %team.name, "Team created");
        Ok(team)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        self.repository.list_teams().await
    }

    #[instrument(skip(self))]
    pub async fn get_team(&self, team_id: i64) -> Result<Team, AppError> {
        self.repository
            .get_team(team_id)
            .await?
            .ok_or_else(|| not_found("Team", team_id))
    }

    #[instrument(skip(self, update))]
    pub async fn update_team(&self, team_id: i64, update: NewTeam) -> Result<Team, AppError> {
        validate_team(&update)?;
        let team = Team {
            id: team_id,
            name: update.name,
            city: update.city,
            sport_type: update.sport_type,
        };
        self.repository.update_team(&team).await?;
        info!(team_id, "Team updated");
        Ok(team)
    }

    #[instrument(skip(self))]
    pub async fn delete_team(&self, team_id: i64) -> Result<(), AppError> {
        self.repository.delete_team(team_id).await
    }

    // Competitions

    #[instrument(skip(self, competition))]
    pub async fn create_competition(
        &self,
        competition: NewCompetition,
    ) -> Result<Competition, AppError> {
        validate_competition(&competition)?;

        let competition = self.repository.create_competition(&competition).await?;
        info!(competition_id = competition.id, name = %competition.name, "Competition created");
        Ok(competition)
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        self.repository.list_competitions().await
    }

    #[instrument(skip(self))]
    pub async fn get_competition(&self, competition_id: i64) -> Result<Competition, AppError> {
        self.repository
            .get_competition(competition_id)
            .await?
            .ok_or_else(|| not_found("Competition", competition_id))
    }

    /// The competition with the results of every match that has both teams recorded
    #[instrument(skip(self))]
    pub async fn competition_detail(
        &self,
        competition_id: i64,
    ) -> Result<CompetitionDetailResponse, AppError> {
        let competition = self.get_competition(competition_id).await?;
        let matches = self
            .repository
            .list_matches_for_competition(competition_id)
            .await?;

        let mut results = Vec::new();
        for played in matches {
            let teams = self.repository.match_teams_for_match(played.id).await?;
            let [first, second] = teams.as_slice() else {
                debug!(match_id = played.id, teams = teams.len(), "Skipping incomplete match");
                continue;
            };

            results.push(MatchResult {
                match_id: played.id,
                team1: self.team_name(first.team_id).await?,
                score1: first.team_score,
                team2: self.team_name(second.team_id).await?,
                score2: second.team_score,
                duration_minutes: played.duration_minutes,
                location: played.location.clone(),
            });
        }

        Ok(CompetitionDetailResponse {
            competition,
            matches: results,
        })
    }

    #[instrument(skip(self, update))]
    pub async fn update_competition(
        &self,
        competition_id: i64,
        update: NewCompetition,
    ) -> Result<Competition, AppError> {
        validate_competition(&update)?;
        let competition = Competition {
            id: competition_id,
            name: update.name,
            prize_pool: update.prize_pool,
            league: update.league,
            sport_type: update.sport_type,
        };
        self.repository.update_competition(&competition).await?;
        info!(competition_id, "Competition updated");
        Ok(competition)
    }

    #[instrument(skip(self))]
    pub async fn delete_competition(&self, competition_id: i64) -> Result<(), AppError> {
        self.repository.delete_competition(competition_id).await
    }

    // Matches

    /// Creates the match together with both teams' scores
    #[instrument(skip(self, request))]
    pub async fn create_match(&self, request: MatchRequest) -> Result<MatchDetailResponse, AppError> {
        validate_match(&request)?;
        let scores = request.scores();

        let (created, teams) = self
            .repository
            .create_match_with_scores(
                &NewMatch {
                    datetime: request.datetime,
                    location: request.location,
                    duration_minutes: request.duration_minutes,
                    competition_id: request.competition_id,
                },
                &scores,
            )
            .await?;

        info!(
            match_id = created.id,
            competition_id = created.competition_id,
            "Match created"
        );
        Ok(MatchDetailResponse {
            details: created,
            teams,
        })
    }

    /// Replaces the match fields and its pair of teams
    #[instrument(skip(self, request))]
    pub async fn update_match(
        &self,
        match_id: i64,
        request: MatchRequest,
    ) -> Result<MatchDetailResponse, AppError> {
        validate_match(&request)?;
        let scores = request.scores();
        let details = Match {
            id: match_id,
            datetime: request.datetime,
            location: request.location,
            duration_minutes: request.duration_minutes,
            competition_id: request.competition_id,
        };

        let teams = self
            .repository
            .update_match_with_scores(&details, &scores)
            .await?;

        info!(match_id, "Match updated");
        Ok(MatchDetailResponse { details, teams })
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, AppError> {
        self.repository.list_matches().await
    }

    #[instrument(skip(self))]
    pub async fn match_detail(&self, match_id: i64) -> Result<MatchDetailResponse, AppError> {
        let details = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| not_found("Match", match_id))?;
        let teams = self.repository.match_teams_for_match(match_id).await?;
        Ok(MatchDetailResponse { details, teams })
    }

    #[instrument(skip(self))]
    pub async fn delete_match(&self, match_id: i64) -> Result<(), AppError> {
        self.repository.delete_match(match_id).await
    }

    /// Inserts or replaces one team's score in a match
    #[instrument(skip(self))]
    pub async fn record_score(&self, score: NewMatchTeam) -> Result<MatchTeam, AppError> {
        ensure(score.team_score >= 0, "Score must not be negative")?;

        match self.repository.upsert_match_team(&score).await? {
            MatchTeamResult::Saved(row) => Ok(row),
            MatchTeamResult::MatchFull => {
                warn!(match_id = score.match_id, team_id = score.team_id, "Match already has two teams");
                Err(AppError::Validation(format!(
                    "Match {} already has two teams",
                    score.match_id
                )))
            }
            MatchTeamResult::MatchNotFound => Err(not_found("Match", score.match_id)),
            MatchTeamResult::TeamNotFound => Err(not_found("Team", score.team_id)),
        }
    }

    pub async fn list_match_teams(&self) -> Result<Vec<MatchTeam>, AppError> {
        self.repository.list_match_teams().await
    }

    #[instrument(skip(self))]
    pub async fn get_match_team(&self, match_team_id: i64) -> Result<MatchTeam, AppError> {
        self.repository
            .get_match_team(match_team_id)
            .await?
            .ok_or_else(|| not_found("Match team", match_team_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_match_team(&self, match_team_id: i64) -> Result<(), AppError> {
        self.repository.delete_match_team(match_team_id).await
    }

    // Users

    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        self.check_user(&user).await?;

        let user = self.repository.create_user(&user).await?;
        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.repository.list_users().await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64) -> Result<User, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| not_found("User", user_id))
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(&self, user_id: i64, update: NewUser) -> Result<User, AppError> {
        self.check_user(&update).await?;
        let user = User {
            id: user_id,
            email: update.email,
            first_name: update.first_name,
            team_id: update.team_id,
            age: update.age,
            gender: update.gender,
            height: update.height,
            weight: update.weight,
            role: update.role,
        };
        self.repository.update_user(&user).await?;
        info!(user_id, role = %user.role, "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        self.repository.delete_user(user_id).await
    }

    // Sensors

    #[instrument(skip(self))]
    pub async fn create_sensor(&self, sensor: NewSensor) -> Result<Sensor, AppError> {
        ensure(sensor.heart_rate > 0, "Heart rate must be positive")?;
        self.repository.create_sensor(&sensor).await
    }

    pub async fn list_sensors(&self) -> Result<Vec<Sensor>, AppError> {
        self.repository.list_sensors().await
    }

    #[instrument(skip(self))]
    pub async fn get_sensor(&self, sensor_id: i64) -> Result<Sensor, AppError> {
        self.repository
            .get_sensor(sensor_id)
            .await?
            .ok_or_else(|| not_found("Sensor", sensor_id))
    }

    #[instrument(skip(self))]
    pub async fn update_sensor(
        &self,
        sensor_id: i64,
        update: NewSensor,
    ) -> Result<Sensor, AppError> {
        ensure(update.heart_rate > 0, "Heart rate must be positive")?;
        let sensor = Sensor {
            id: sensor_id,
            heart_rate: update.heart_rate,
        };
        self.repository.update_sensor(&sensor).await?;
        Ok(sensor)
    }

    #[instrument(skip(self))]
    pub async fn delete_sensor(&self, sensor_id: i64) -> Result<(), AppError> {
        self.repository.delete_sensor(sensor_id).await
    }

    // Trainings

    /// Creates the training and enrolls the listed participants
    #[instrument(skip(self, request))]
    pub async fn create_training(
        &self,
        request: CreateTrainingRequest,
    ) -> Result<TrainingResponse, AppError> {
        ensure(
            request.duration_minutes > 0,
            "Duration must be positive",
        )?;
        let mut seen = HashSet::new();
        for participant in &request.participants {
            if !seen.insert(participant.user_id) {
                return Err(AppError::Validation(format!(
                    "User {} is listed twice",
                    participant.user_id
                )));
            }
            self.check_enrollment(participant.user_id, participant.sensor_id, participant.intensity)
                .await?;
        }

        let training = self
            .repository
            .create_training(&NewTraining {
                datetime: request.datetime,
                location: request.location,
                duration_minutes: request.duration_minutes,
            })
            .await?;

        let mut participants = Vec::with_capacity(request.participants.len());
        for participant in request.participants {
            participants.push(
                self.repository
                    .create_user_training(&NewUserTraining {
                        user_id: participant.user_id,
                        sensor_id: participant.sensor_id,
                        training_id: training.id,
                        intensity: participant.intensity,
                    })
                    .await?,
            );
        }

        info!(
            training_id = training.id,
            participants = participants.len(),
            "Training created"
        );
        Ok(TrainingResponse {
            training,
            participants,
        })
    }

    #[instrument(skip(self))]
    pub async fn enroll(&self, enrollment: NewUserTraining) -> Result<UserTraining, AppError> {
        self.check_enrollment(enrollment.user_id, enrollment.sensor_id, enrollment.intensity)
            .await?;
        self.get_training(enrollment.training_id).await?;

        let created = self.repository.create_user_training(&enrollment).await?;
        info!(
            user_training_id = created.id,
            training_id = created.training_id,
            "Athlete enrolled"
        );
        Ok(created)
    }

    pub async fn list_user_trainings(&self) -> Result<Vec<UserTraining>, AppError> {
        self.repository.list_user_trainings().await
    }

    #[instrument(skip(self))]
    pub async fn get_user_training(&self, user_training_id: i64) -> Result<UserTraining, AppError> {
        self.repository
            .get_user_training(user_training_id)
            .await?
            .ok_or_else(|| not_found("User training", user_training_id))
    }

    #[instrument(skip(self))]
    pub async fn update_user_training(
        &self,
        user_training_id: i64,
        update: NewUserTraining,
    ) -> Result<UserTraining, AppError> {
        self.check_enrollment(update.user_id, update.sensor_id, update.intensity)
            .await?;
        self.get_training(update.training_id).await?;

        let user_training = UserTraining {
            id: user_training_id,
            user_id: update.user_id,
            sensor_id: update.sensor_id,
            training_id: update.training_id,
            intensity: update.intensity,
        };
        self.repository.update_user_training(&user_training).await?;
        Ok(user_training)
    }

    #[instrument(skip(self))]
    pub async fn delete_user_training(&self, user_training_id: i64) -> Result<(), AppError> {
        self.repository.delete_user_training(user_training_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_training(&self, training_id: i64) -> Result<Training, AppError> {
        self.repository
            .get_training(training_id)
            .await?
            .ok_or_else(|| not_found("Training", training_id))
    }

    /// The training with everyone enrolled in it
    #[instrument(skip(self))]
    pub async fn training_detail(&self, training_id: i64) -> Result<TrainingResponse, AppError> {
        let training = self.get_training(training_id).await?;
        let participants = self
            .repository
            .user_trainings_for_training(training_id)
            .await?;
        Ok(TrainingResponse {
            training,
            participants,
        })
    }

    /// Only coaches and admins may reschedule a training
    #[instrument(skip(self, update))]
    pub async fn update_training(
        &self,
        training_id: i64,
        update: NewTraining,
        role: Role,
    ) -> Result<Training, AppError> {
        if !role.can_manage_trainings() {
            warn!(training_id, role = %role, "Training update refused");
            return Err(AppError::Forbidden(format!(
                "Role {} may not change trainings",
                role
            )));
        }
        ensure(update.duration_minutes > 0, "Duration must be positive")?;

        let training = Training {
            id: training_id,
            datetime: update.datetime,
            location: update.location,
            duration_minutes: update.duration_minutes,
        };
        self.repository.update_training(&training).await?;
        info!(training_id, "Training updated");
        Ok(training)
    }

    /// Every day of the month with the trainings scheduled on it
    #[instrument(skip(self))]
    pub async fn training_calendar(
        &self,
        year: i32,
        month: u32,
    ) -> Result<CalendarResponse, AppError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            AppError::Validation(format!("Invalid calendar month {}-{}", year, month))
        })?;
        let next_month = first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::Validation("Calendar month out of range".to_string()))?;

        let start = Utc.from_utc_datetime(&first_day.and_time(chrono::NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&next_month.and_time(chrono::NaiveTime::MIN));
        let trainings = self.repository.list_trainings_between(start, end).await?;

        let days = first_day
            .iter_days()
            .take_while(|date| *date < next_month)
            .map(|date| CalendarDay {
                date,
                trainings: trainings
                    .iter()
                    .filter(|t| t.datetime.date_naive() == date)
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(CalendarResponse {
            year: first_day.year(),
            month: first_day.month(),
            days,
        })
    }

    /// Only coaches and admins may remove a training
    #[instrument(skip(self))]
    pub async fn delete_training(&self, training_id: i64, role: Role) -> Result<(), AppError> {
        if !role.can_manage_trainings() {
            warn!(training_id, role = %role, "Training deletion refused");
            return Err(AppError::Forbidden(format!(
                "Role {} may not delete trainings",
                role
            )));
        }
        self.repository.delete_training(training_id).await
    }

    async fn check_user(&self, user: &NewUser) -> Result<(), AppError> {
        ensure(user.email.contains('@'), "Email address is invalid")?;
        ensure(!user.first_name.trim().is_empty(), "First name must not be empty")?;
        ensure(user.age > 0, "Age must be positive")?;
        ensure(
            user.height > 0 && user.weight > 0,
            "Height and weight must be positive",
        )?;
        if let Some(team_id) = user.team_id {
            self.get_team(team_id).await?;
        }
        Ok(())
    }

    async fn check_enrollment(
        &self,
        user_id: i64,
        sensor_id: i64,
        intensity: i32,
    ) -> Result<(), AppError> {
        ensure(intensity > 0, "Intensity must be positive")?;
        self.get_user(user_id).await?;
        self.get_sensor(sensor_id).await?;
        Ok(())
    }

    async fn team_name(&self, team_id: i64) -> Result<String, AppError> {
        Ok(self.get_team(team_id).await?.name)
    }
}

fn validate_competition(competition: &NewCompetition) -> Result<(), AppError> {
    ensure(
        !competition.name.trim().is_empty(),
        "Competition name must not be empty",
    )?;
    ensure(
        competition.prize_pool >= Decimal::ZERO,
        "Prize pool must not be negative",
    )
}

fn validate_match(request: &MatchRequest) -> Result<(), AppError> {
    ensure(
        request.team1_id != request.team2_id,
        "A match needs two different teams",
    )?;
    ensure(
        request.team1_score >= 0 && request.team2_score >= 0,
        "Scores must not be negative",
    )?;
    ensure(request.duration_minutes > 0, "Duration must be positive")
}

fn validate_team(team: &NewTeam) -> Result<(), AppError> {
    ensure(!team.name.trim().is_empty(), "Team name must not be empty")?;
    ensure(!team.city.trim().is_empty(), "City must not be empty")?;
    ensure(
        !team.sport_type.trim().is_empty(),
        "Sport type must not be empty",
    )
}
