#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::assertions::ResponseAssertion;
use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the router and capture the JSON response
    pub async fn send(&self, request: Request<Body>) -> ResponseAssertion {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        ResponseAssertion::new(status, body)
    }

    pub async fn get(&self, uri: &str) -> ResponseAssertion {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> ResponseAssertion {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn put(&self, uri: &str, body: Value, role: Option<&str>) -> ResponseAssertion {
        let mut request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(role) = role {
            request = request.header("x-club-role", role);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, role: Option<&str>) -> ResponseAssertion {
        let mut request = Request::builder().method("DELETE").uri(uri);
        if let Some(role) = role {
            request = request.header("x-club-role", role);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Create a team and return its id
    pub async fn create_team(&self, name: &str) -> i64 {
        self.post(
            "/teams",
            json!({"name": name, "city": "Dnipro", "sport_type": "football"}),
        )
        .await
        .status(StatusCode::OK)
        .id()
    }

    pub async fn create_competition(&self, name: &str) -> i64 {
        self.post(
            "/competitions",
            json!({
                "name": name,
                "prize_pool": "2500.00",
                "league": "Amateur",
                "sport_type": "football"
            }),
        )
        .await
        .status(StatusCode::OK)
        .id()
    }

    /// Create a match between two teams with their final scores
    pub async fn play_match(
        &self,
        competition_id: i64,
        (team1_id, team1_score): (i64, i32),
        (team2_id, team2_score): (i64, i32),
    ) -> i64 {
        self.post(
            "/matches",
            json!({
                "datetime": "2024-04-20T16:00:00Z",
                "location": "City Stadium",
                "duration_minutes": 90,
                "competition_id": competition_id,
                "team1_id": team1_id,
                "team1_score": team1_score,
                "team2_id": team2_id,
                "team2_score": team2_score
            }),
        )
        .await
        .status(StatusCode::OK)
        .body["match"]["id"]
            .as_i64()
            .unwrap()
    }

    pub async fn create_user(&self, email: &str, age: i32, team_id: Option<i64>) -> i64 {
        self.post(
            "/users",
            json!({
                "email": email,
                "first_name": "Test",
                "team_id": team_id,
                "age": age,
                "gender": "female",
                "height": 170,
                "weight": 60
            }),
        )
        .await
        .status(StatusCode::OK)
        .id()
    }

    pub async fn create_sensor(&self, heart_rate: i32) -> i64 {
        self.post("/sensors", json!({"heart_rate": heart_rate}))
            .await
            .status(StatusCode::OK)
            .id()
    }

    /// Create a training at the given timestamp with one participant
    pub async fn train(&self, datetime: &str, user_id: i64, sensor_id: i64, intensity: i32) -> i64 {
        self.post(
            "/trainings",
            json!({
                "datetime": datetime,
                "location": "Gym",
                "duration_minutes": 60,
                "participants": [
                    {"user_id": user_id, "sensor_id": sensor_id, "intensity": intensity}
                ]
            }),
        )
        .await
        .status(StatusCode::OK)
        .body["training"]["id"]
            .as_i64()
            .unwrap()
    }
}
