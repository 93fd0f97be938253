use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{
        Competition, Match, MatchTeam, NewCompetition, NewMatchTeam, NewSensor, NewTeam,
        NewTraining, NewUser, NewUserTraining, Role, Sensor, Team, Training, User,
        UserTraining,
    },
    service::ClubService,
    types::{
        CalendarResponse, CompetitionDetailResponse, CreateTrainingRequest, MatchDetailResponse,
        MatchRequest, TeamDetailResponse, TrainingResponse, UserDetailResponse, ROLE_HEADER,
    },
};
use crate::shared::{AppError, AppState};
use crate::stats::StatsService;

fn club_service(state: &AppState) -> ClubService {
    ClubService::new(Arc::clone(&state.club_repository))
}

fn stats_service(state: &AppState) -> StatsService {
    StatsService::new(
        Arc::clone(&state.stats_repository),
        state.config.recent_training_limit,
    )
}

/// Reads the caller's role; a missing header means the least privileged role
fn caller_role(headers: &HeaderMap) -> Result<Role, AppError> {
    let Some(value) = headers.get(ROLE_HEADER) else {
        return Ok(Role::default());
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Validation(format!("{} header is not valid text", ROLE_HEADER)))?;
    Role::try_from(value).map_err(|role| AppError::Validation(format!("Unknown role: {}", role)))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

// Teams

/// POST /teams
#[instrument(name = "create_team", skip(state, request))]
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<NewTeam>,
) -> Result<Json<Team>, AppError> {
    let team = club_service(&state).create_team(request).await?;
    Ok(Json(team))
}

/// GET /teams
#[instrument(name = "list_teams", skip(state))]
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, AppError> {
    let teams = club_service(&state).list_teams().await?;
    info!(team_count = teams.len(), "Teams listed");
    Ok(Json(teams))
}

/// GET /teams/:id
///
/// The team together with its statistics
#[instrument(name = "get_team", skip(state))]
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<TeamDetailResponse>, AppError> {
    let team = club_service(&state).get_team(team_id).await?;
    let statistics = stats_service(&state).team_statistics(team_id).await?;

    Ok(Json(TeamDetailResponse { team, statistics }))
}

/// PUT /teams/:id
#[instrument(name = "update_team", skip(state, request))]
pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(request): Json<NewTeam>,
) -> Result<Json<Team>, AppError> {
    let team = club_service(&state).update_team(team_id, request).await?;
    Ok(Json(team))
}

/// DELETE /teams/:id
#[instrument(name = "delete_team", skip(state))]
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state).delete_team(team_id).await?;
    info!(team_id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Competitions

/// POST /competitions
#[instrument(name = "create_competition", skip(state, request))]
pub async fn create_competition(
    State(state): State<AppState>,
    Json(request): Json<NewCompetition>,
) -> Result<Json<Competition>, AppError> {
    let competition = club_service(&state).create_competition(request).await?;
    Ok(Json(competition))
}

/// GET /competitions
#[instrument(name = "list_competitions", skip(state))]
pub async fn list_competitions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Competition>>, AppError> {
    let competitions = club_service(&state).list_competitions().await?;
    Ok(Json(competitions))
}

/// GET /competitions/:id
#[instrument(name = "get_competition", skip(state))]
pub async fn get_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
) -> Result<Json<CompetitionDetailResponse>, AppError> {
    let detail = club_service(&state)
        .competition_detail(competition_id)
        .await?;
    info!(
        competition_id,
        match_count = detail.matches.len(),
        "Competition results served"
    );
    Ok(Json(detail))
}

/// PUT /competitions/:id
#[instrument(name = "update_competition", skip(state, request))]
pub async fn update_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
    Json(request): Json<NewCompetition>,
) -> Result<Json<Competition>, AppError> {
    let competition = club_service(&state)
        .update_competition(competition_id, request)
        .await?;
    Ok(Json(competition))
}

/// DELETE /competitions/:id
#[instrument(name = "delete_competition", skip(state))]
pub async fn delete_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state)
        .delete_competition(competition_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Matches

/// POST /matches
#[instrument(name = "create_match", skip(state, request))]
pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchDetailResponse>, AppError> {
    let created = club_service(&state).create_match(request).await?;
    Ok(Json(created))
}

/// GET /matches
#[instrument(name = "list_matches", skip(state))]
pub async fn list_matches(State(state): State<AppState>) -> Result<Json<Vec<Match>>, AppError> {
    let matches = club_service(&state).list_matches().await?;
    Ok(Json(matches))
}

/// GET /matches/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<Json<MatchDetailResponse>, AppError> {
    let detail = club_service(&state).match_detail(match_id).await?;
    Ok(Json(detail))
}

/// PUT /matches/:id
///
/// Replaces the match and both teams' scores together
#[instrument(name = "update_match", skip(state, request))]
pub async fn update_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchDetailResponse>, AppError> {
    let updated = club_service(&state).update_match(match_id, request).await?;
    Ok(Json(updated))
}

/// DELETE /matches/:id
#[instrument(name = "delete_match", skip(state))]
pub async fn delete_match(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state).delete_match(match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /match-teams
#[instrument(name = "record_match_score", skip(state))]
pub async fn record_match_score(
    State(state): State<AppState>,
    Json(request): Json<NewMatchTeam>,
) -> Result<Json<MatchTeam>, AppError> {
    let row = club_service(&state).record_score(request).await?;
    Ok(Json(row))
}

/// GET /match-teams
#[instrument(name = "list_match_teams", skip(state))]
pub async fn list_match_teams(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchTeam>>, AppError> {
    let rows = club_service(&state).list_match_teams().await?;
    Ok(Json(rows))
}

/// GET /match-teams/:id
#[instrument(name = "get_match_team", skip(state))]
pub async fn get_match_team(
    State(state): State<AppState>,
    Path(match_team_id): Path<i64>,
) -> Result<Json<MatchTeam>, AppError> {
    let row = club_service(&state).get_match_team(match_team_id).await?;
    Ok(Json(row))
}

/// DELETE /match-teams/:id
#[instrument(name = "delete_match_team", skip(state))]
pub async fn delete_match_team(
    State(state): State<AppState>,
    Path(match_team_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state)
        .delete_match_team(match_team_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Users

/// POST /users
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<Json<User>, AppError> {
    let user = club_service(&state).create_user(request).await?;
    Ok(Json(user))
}

/// GET /users
#[instrument(name = "list_users", skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = club_service(&state).list_users().await?;
    Ok(Json(users))
}

/// GET /users/:id
///
/// Athlete profile with latest sessions and a training recommendation
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDetailResponse>, AppError> {
    let user = club_service(&state).get_user(user_id).await?;
    let training = stats_service(&state)
        .athlete_training_summary(user_id)
        .await?;

    Ok(Json(UserDetailResponse { user, training }))
}

/// PUT /users/:id
#[instrument(name = "update_user", skip(state, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<NewUser>,
) -> Result<Json<User>, AppError> {
    let user = club_service(&state).update_user(user_id, request).await?;
    Ok(Json(user))
}

/// DELETE /users/:id
#[instrument(name = "delete_user", skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state).delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Sensors

/// POST /sensors
#[instrument(name = "create_sensor", skip(state))]
pub async fn create_sensor(
    State(state): State<AppState>,
    Json(request): Json<NewSensor>,
) -> Result<Json<Sensor>, AppError> {
    let sensor = club_service(&state).create_sensor(request).await?;
    Ok(Json(sensor))
}

/// GET /sensors
#[instrument(name = "list_sensors", skip(state))]
pub async fn list_sensors(State(state): State<AppState>) -> Result<Json<Vec<Sensor>>, AppError> {
    let sensors = club_service(&state).list_sensors().await?;
    Ok(Json(sensors))
}

/// GET /sensors/:id
#[instrument(name = "get_sensor", skip(state))]
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(sensor_id): Path<i64>,
) -> Result<Json<Sensor>, AppError> {
    let sensor = club_service(&state).get_sensor(sensor_id).await?;
    Ok(Json(sensor))
}

/// PUT /sensors/:id
#[instrument(name = "update_sensor", skip(state))]
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(sensor_id): Path<i64>,
    Json(request): Json<NewSensor>,
) -> Result<Json<Sensor>, AppError> {
    let sensor = club_service(&state).update_sensor(sensor_id, request).await?;
    Ok(Json(sensor))
}

/// DELETE /sensors/:id
#[instrument(name = "delete_sensor", skip(state))]
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(sensor_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state).delete_sensor(sensor_id).await?;
    info!(sensor_id, "Sensor deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Trainings

/// POST /trainings
#[instrument(name = "create_training", skip(state, request))]
pub async fn create_training(
    State(state): State<AppState>,
    Json(request): Json<CreateTrainingRequest>,
) -> Result<Json<TrainingResponse>, AppError> {
    let training = club_service(&state).create_training(request).await?;
    Ok(Json(training))
}

/// GET /trainings/calendar/:year/:month
#[instrument(name = "training_calendar", skip(state))]
pub async fn training_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CalendarResponse>, AppError> {
    let calendar = club_service(&state).training_calendar(year, month).await?;
    Ok(Json(calendar))
}

/// GET /trainings/:id
#[instrument(name = "get_training", skip(state))]
pub async fn get_training(
    State(state): State<AppState>,
    Path(training_id): Path<i64>,
) -> Result<Json<TrainingResponse>, AppError> {
    let detail = club_service(&state).training_detail(training_id).await?;
    Ok(Json(detail))
}

/// PUT /trainings/:id
///
/// Requires the `x-club-role` header to name a coach or admin
#[instrument(name = "update_training", skip(state, headers, request))]
pub async fn update_training(
    State(state): State<AppState>,
    Path(training_id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<NewTraining>,
) -> Result<Json<Training>, AppError> {
    let role = caller_role(&headers).inspect_err(|e| {
        warn!(training_id, error = %e, "Rejected role header");
    })?;

    let training = club_service(&state)
        .update_training(training_id, request, role)
        .await?;
    Ok(Json(training))
}

/// DELETE /trainings/:id
///
/// Requires the `x-club-role` header to name a coach or admin
#[instrument(name = "delete_training", skip(state, headers))]
pub async fn delete_training(
    State(state): State<AppState>,
    Path(training_id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let role = caller_role(&headers).inspect_err(|e| {
        warn!(training_id, error = %e, "Rejected role header");
    })?;

    club_service(&state)
        .delete_training(training_id, role)
        .await?;

    info!(training_id, role = %role, "Training deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /user-trainings
#[instrument(name = "enroll_user", skip(state))]
pub async fn enroll_user(
    State(state): State<AppState>,
    Json(request): Json<NewUserTraining>,
) -> Result<Json<UserTraining>, AppError> {
    let enrollment = club_service(&state).enroll(request).await?;
    Ok(Json(enrollment))
}

/// GET /user-trainings
#[instrument(name = "list_user_trainings", skip(state))]
pub async fn list_user_trainings(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserTraining>>, AppError> {
    let enrollments = club_service(&state).list_user_trainings().await?;
    Ok(Json(enrollments))
}

/// GET /user-trainings/:id
#[instrument(name = "get_user_training", skip(state))]
pub async fn get_user_training(
    State(state): State<AppState>,
    Path(user_training_id): Path<i64>,
) -> Result<Json<UserTraining>, AppError> {
    let enrollment = club_service(&state)
        .get_user_training(user_training_id)
        .await?;
    Ok(Json(enrollment))
}

/// PUT /user-trainings/:id
#[instrument(name = "update_user_training", skip(state))]
pub async fn update_user_training(
    State(state): State<AppState>,
    Path(user_training_id): Path<i64>,
    Json(request): Json<NewUserTraining>,
) -> Result<Json<UserTraining>, AppError> {
    let enrollment = club_service(&state)
        .update_user_training(user_training_id, request)
        .await?;
    Ok(Json(enrollment))
}

/// DELETE /user-trainings/:id
#[instrument(name = "delete_user_training", skip(state))]
pub async fn delete_user_training(
    State(state): State<AppState>,
    Path(user_training_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    club_service(&state)
        .delete_user_training(user_training_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
