use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::club::handlers as club;
use crate::shared::AppState;
use crate::stats;

/// Builds the HTTP API over the given application state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(club::health))
        .route("/teams", get(club::list_teams).post(club::create_team))
        .route(
            "/teams/:id",
            get(club::get_team)
                .put(club::update_team)
                .delete(club::delete_team),
        )
        .route("/teams/:id/stats", get(stats::team_statistics))
        .route(
            "/competitions",
            get(club::list_competitions).post(club::create_competition),
        )
        .route(
            "/competitions/:id",
            get(club::get_competition)
                .put(club::update_competition)
                .delete(club::delete_competition),
        )
        .route("/matches", get(club::list_matches).post(club::create_match))
        .route(
            "/matches/:id",
            get(club::get_match)
                .put(club::update_match)
                .delete(club::delete_match),
        )
        .route(
            "/match-teams",
            get(club::list_match_teams).post(club::record_match_score),
        )
        .route(
            "/match-teams/:id",
            get(club::get_match_team).delete(club::delete_match_team),
        )
        .route("/users", get(club::list_users).post(club::create_user))
        .route(
            "/users/:id",
            get(club::get_user)
                .put(club::update_user)
                .delete(club::delete_user),
        )
        .route(
            "/users/:id/recommendation",
            get(stats::training_recommendation),
        )
        .route("/sensors", get(club::list_sensors).post(club::create_sensor))
        .route(
            "/sensors/:id",
            get(club::get_sensor)
                .put(club::update_sensor)
                .delete(club::delete_sensor),
        )
        .route("/trainings", post(club::create_training))
        .route(
            "/trainings/calendar/:year/:month",
            get(club::training_calendar),
        )
        .route(
            "/trainings/:id",
            get(club::get_training)
                .put(club::update_training)
                .delete(club::delete_training),
        )
        .route(
            "/user-trainings",
            get(club::list_user_trainings).post(club::enroll_user),
        )
        .route(
            "/user-trainings/:id",
            get(club::get_user_training)
                .put(club::update_user_training)
                .delete(club::delete_user_training),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
