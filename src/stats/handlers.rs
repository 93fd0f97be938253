use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{service::StatsService, AthleteTrainingSummary, TeamStatistics};
use crate::shared::{AppError, AppState};

/// GET /teams/:id/stats
#[instrument(name = "team_statistics", skip(state))]
pub async fn team_statistics(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<TeamStatistics>, AppError> {
    let service = StatsService::new(
        state.stats_repository.clone(),
        state.config.recent_training_limit,
    );
    let stats = service.team_statistics(team_id).await?;

    info!(team_id, "Team statistics served");
    Ok(Json(stats))
}

/// GET /users/:id/recommendation
#[instrument(name = "training_recommendation", skip(state))]
pub async fn training_recommendation(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<AthleteTrainingSummary>, AppError> {
    let service = StatsService::new(
        state.stats_repository.clone(),
        state.config.recent_training_limit,
    );
    let summary = service.athlete_training_summary(user_id).await?;

    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::club::repository::{ClubRepository, InMemoryClubRepository};
    use crate::club::repository::tests::helpers::*;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::stats::TrainingRecommendation;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(store: Arc<InMemoryClubRepository>) -> Router {
        Router::new()
            .route("/teams/:id/stats", get(team_statistics))
            .route("/users/:id/recommendation", get(training_recommendation))
            .with_state(AppStateBuilder::new().with_store(store).build())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_team_statistics_handler() {
        let store = Arc::new(InMemoryClubRepository::new());
        let team = store.create_team(&new_team("Lions")).await.unwrap();
        store
            .create_user(&new_user("a@club.test", 22, Some(team.id)))
            .await
            .unwrap();

        let (status, body) = get_json(app(store), &format!("/teams/{}/stats", team.id)).await;

        assert_eq!(status, StatusCode::OK);
        let stats: TeamStatistics = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats.team_id, team.id);
        assert_eq!(stats.average_age, Some(22.0));
        assert_eq!(stats.win_percentage, 0.0);
    }

    #[tokio::test]
    async fn test_team_statistics_handler_unknown_team() {
        let store = Arc::new(InMemoryClubRepository::new());

        let (status, body) = get_json(app(store), "/teams/99/stats").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "Team 99 not found");
    }

    #[tokio::test]
    async fn test_training_recommendation_handler() {
        let store = Arc::new(InMemoryClubRepository::new());
        let user = store
            .create_user(&new_user("a@club.test", 30, None))
            .await
            .unwrap();

        let (status, body) =
            get_json(app(store), &format!("/users/{}/recommendation", user.id)).await;

        assert_eq!(status, StatusCode::OK);
        let summary: AthleteTrainingSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary.age, 30);
        assert_eq!(
            summary.report.recommendation,
            TrainingRecommendation::NoRecentData
        );
        assert_eq!(summary.report.zones.max_heart_rate, 190.0);
    }

    #[tokio::test]
    async fn test_training_recommendation_handler_invalid_id() {
        let store = Arc::new(InMemoryClubRepository::new());

        let (status, _) = get_json(app(store), "/users/abc/recommendation").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
