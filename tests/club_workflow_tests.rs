use axum::http::StatusCode;
use serde_json::json;

mod utils;

use utils::*;

#[tokio::test]
async fn test_health_check() {
    let setup = TestSetupBuilder::new().build();

    let response = setup.get("/health").await.status(StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_team_statistics_across_competitions() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let bears = setup.create_team("Bears").await;
    let cup = setup.create_competition("Cup").await;
    let league = setup.create_competition("League").await;

    setup.play_match(cup, (lions, 3), (tigers, 1)).await;
    setup.play_match(league, (lions, 0), (bears, 2)).await;
    setup.play_match(league, (lions, 5), (tigers, 0)).await;
    setup.create_user("a@club.test", 20, Some(lions)).await;
    setup.create_user("b@club.test", 30, Some(lions)).await;

    let stats = setup
        .get(&format!("/teams/{}/stats", lions))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(stats["competitions_participated"], 2);
    assert_eq!(stats["most_successful_competition"], "League");
    assert_eq!(stats["most_successful_competition_id"], league);
    assert_eq!(stats["most_successful_competition_score"], 5);
    assert_eq!(stats["average_age"], 25.0);

    let win_percentage = stats["win_percentage"].as_f64().unwrap();
    assert!((win_percentage - 200.0 / 3.0).abs() < 1e-9);
    let average_score = stats["average_score"].as_f64().unwrap();
    assert!((average_score - 8.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_team_page_matches_stats_endpoint() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let cup = setup.create_competition("Cup").await;
    setup.play_match(cup, (lions, 1), (tigers, 1)).await;

    let page = setup
        .get(&format!("/teams/{}", lions))
        .await
        .status(StatusCode::OK)
        .body;
    let stats = setup
        .get(&format!("/teams/{}/stats", lions))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(page["team"]["name"], "Lions");
    assert_eq!(page["statistics"], stats);
    // a draw is not a win
    assert_eq!(stats["win_percentage"], 0.0);
}

#[tokio::test]
async fn test_competition_results_show_team_names() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let cup = setup.create_competition("Cup").await;
    setup.play_match(cup, (lions, 4), (tigers, 2)).await;

    let detail = setup
        .get(&format!("/competitions/{}", cup))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(detail["competition"]["name"], "Cup");
    let results = detail["matches"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["team1"], "Lions");
    assert_eq!(results[0]["score1"], 4);
    assert_eq!(results[0]["team2"], "Tigers");
    assert_eq!(results[0]["score2"], 2);
    assert_eq!(results[0]["duration_minutes"], 90);
}

#[tokio::test]
async fn test_match_holds_at_most_two_teams() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let bears = setup.create_team("Bears").await;
    let cup = setup.create_competition("Cup").await;
    let match_id = setup.play_match(cup, (lions, 1), (tigers, 0)).await;

    setup
        .post(
            "/match-teams",
            json!({"match_id": match_id, "team_id": bears, "team_score": 2}),
        )
        .await
        .status(StatusCode::BAD_REQUEST);

    // re-recording an existing team replaces its score
    setup
        .post(
            "/match-teams",
            json!({"match_id": match_id, "team_id": tigers, "team_score": 3}),
        )
        .await
        .status(StatusCode::OK);

    let detail = setup
        .get(&format!("/matches/{}", match_id))
        .await
        .status(StatusCode::OK)
        .body;
    let teams = detail["teams"].as_array().unwrap();
    assert_eq!(teams.len(), 2);
    assert!(teams
        .iter()
        .any(|t| t["team_id"] == tigers && t["team_score"] == 3));
}

#[tokio::test]
async fn test_deleting_competition_removes_its_matches() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let cup = setup.create_competition("Cup").await;
    let match_id = setup.play_match(cup, (lions, 2), (tigers, 1)).await;

    setup
        .delete(&format!("/competitions/{}", cup), None)
        .await
        .status(StatusCode::NO_CONTENT);

    setup
        .get(&format!("/matches/{}", match_id))
        .await
        .status(StatusCode::NOT_FOUND);
    let stats = setup
        .get(&format!("/teams/{}/stats", lions))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(stats["competitions_participated"], 0);
    assert_eq!(stats["average_score"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_deleting_team_detaches_members() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let user = setup.create_user("a@club.test", 27, Some(lions)).await;

    setup
        .delete(&format!("/teams/{}", lions), None)
        .await
        .status(StatusCode::NO_CONTENT);

    let page = setup
        .get(&format!("/users/{}", user))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(page["user"]["team_id"], serde_json::Value::Null);
    setup
        .get(&format!("/teams/{}/stats", lions))
        .await
        .status(StatusCode::NOT_FOUND)
        .error(&format!("Team {} not found", lions));
}

#[tokio::test]
async fn test_recommendation_follows_heart_rate_zones() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("runner@club.test", 30, None).await;
    let sensor = setup.create_sensor(140).await;

    setup.train("2024-05-01T08:00:00Z", user, sensor, 100).await;
    setup.train("2024-05-02T08:00:00Z", user, sensor, 110).await;
    setup.train("2024-05-03T08:00:00Z", user, sensor, 120).await;
    setup.train("2024-05-04T08:00:00Z", user, sensor, 150).await;

    let report = setup
        .get(&format!("/users/{}/recommendation", user))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(report["report"]["recommendation"], "moderate_heavy");
    assert_eq!(
        report["report"]["message"],
        "You are doing a good amount of moderate intensity training. Keep it up!"
    );
    assert_eq!(report["report"]["moderate_count"], 3);
    assert_eq!(report["report"]["high_count"], 1);
    assert_eq!(report["report"]["zones"]["max_heart_rate"], 190.0);
    assert_eq!(report["recent_trainings"][0]["intensity"], 150);
}

#[tokio::test]
async fn test_recommendation_window_uses_latest_sessions() {
    let setup = TestSetupBuilder::new()
        .with_recent_training_limit(2)
        .build();
    let user = setup.create_user("runner@club.test", 30, None).await;
    let sensor = setup.create_sensor(140).await;

    setup.train("2024-05-01T08:00:00Z", user, sensor, 100).await;
    setup.train("2024-05-02T08:00:00Z", user, sensor, 100).await;
    setup.train("2024-05-03T08:00:00Z", user, sensor, 155).await;
    setup.train("2024-05-04T08:00:00Z", user, sensor, 160).await;

    let report = setup
        .get(&format!("/users/{}/recommendation", user))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(report["report"]["total"], 2);
    assert_eq!(report["report"]["recommendation"], "high_intensity_heavy");
}

#[tokio::test]
async fn test_readings_outside_zones_give_balanced_advice() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("walker@club.test", 30, None).await;
    let sensor = setup.create_sensor(80).await;

    // below the moderate zone and above the high zone
    setup.train("2024-05-01T08:00:00Z", user, sensor, 60).await;
    setup.train("2024-05-02T08:00:00Z", user, sensor, 185).await;

    let report = setup
        .get(&format!("/users/{}/recommendation", user))
        .await
        .status(StatusCode::OK)
        .body;

    assert_eq!(report["report"]["recommendation"], "balanced");
    assert_eq!(report["report"]["moderate_count"], 0);
    assert_eq!(report["report"]["high_count"], 0);
}

#[tokio::test]
async fn test_training_calendar_and_role_gated_delete() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("a@club.test", 25, None).await;
    let sensor = setup.create_sensor(120).await;
    let training = setup.train("2024-02-29T18:30:00Z", user, sensor, 110).await;

    let calendar = setup
        .get("/trainings/calendar/2024/2")
        .await
        .status(StatusCode::OK)
        .body;
    let days = calendar["days"].as_array().unwrap();
    assert_eq!(days.len(), 29);
    assert_eq!(days[28]["trainings"][0]["id"], training);

    setup
        .delete(&format!("/trainings/{}", training), Some("sportsman"))
        .await
        .status(StatusCode::FORBIDDEN);
    setup
        .delete(&format!("/trainings/{}", training), Some("admin"))
        .await
        .status(StatusCode::NO_CONTENT);

    let calendar = setup
        .get("/trainings/calendar/2024/2")
        .await
        .status(StatusCode::OK)
        .body;
    assert!(calendar["days"][28]["trainings"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_enrollment_validates_references() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("a@club.test", 25, None).await;
    let sensor = setup.create_sensor(120).await;

    setup
        .post(
            "/user-trainings",
            json!({"user_id": user, "sensor_id": sensor, "training_id": 999, "intensity": 100}),
        )
        .await
        .status(StatusCode::NOT_FOUND)
        .error("Training 999 not found");

    setup
        .post(
            "/user-trainings",
            json!({"user_id": user, "sensor_id": sensor, "training_id": 999, "intensity": 0}),
        )
        .await
        .status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let setup = TestSetupBuilder::new().build();
    setup.create_user("dup@club.test", 25, None).await;

    setup
        .post(
            "/users",
            json!({
                "email": "dup@club.test",
                "first_name": "Again",
                "age": 26,
                "gender": "male",
                "height": 180,
                "weight": 80
            }),
        )
        .await
        .status(StatusCode::BAD_REQUEST)
        .error("User with email dup@club.test already exists");
}

#[tokio::test]
async fn test_athlete_enrolls_once_per_training() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("a@club.test", 25, None).await;
    let sensor = setup.create_sensor(120).await;
    let training = setup.train("2024-05-01T08:00:00Z", user, sensor, 110).await;

    setup
        .post(
            "/user-trainings",
            json!({"user_id": user, "sensor_id": sensor, "training_id": training, "intensity": 130}),
        )
        .await
        .status(StatusCode::BAD_REQUEST)
        .error(&format!(
            "User {} is already enrolled in training {}",
            user, training
        ));

    // the same athlete listed twice in one new training
    setup
        .post(
            "/trainings",
            json!({
                "datetime": "2024-05-02T08:00:00Z",
                "location": "Gym",
                "duration_minutes": 60,
                "participants": [
                    {"user_id": user, "sensor_id": sensor, "intensity": 100},
                    {"user_id": user, "sensor_id": sensor, "intensity": 140}
                ]
            }),
        )
        .await
        .status(StatusCode::BAD_REQUEST);

    let detail = setup
        .get(&format!("/trainings/{}", training))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(detail["participants"].as_array().unwrap().len(), 1);
    let report = setup
        .get(&format!("/users/{}/recommendation", user))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(report["report"]["total"], 1);
}

#[tokio::test]
async fn test_failed_match_create_stores_nothing() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let cup = setup.create_competition("Cup").await;

    setup
        .post(
            "/matches",
            json!({
                "datetime": "2024-04-20T16:00:00Z",
                "location": "City Stadium",
                "duration_minutes": 90,
                "competition_id": cup,
                "team1_id": lions,
                "team1_score": 2,
                "team2_id": 999,
                "team2_score": 1
            }),
        )
        .await
        .status(StatusCode::NOT_FOUND)
        .error("Team 999 not found");

    let matches = setup.get("/matches").await.status(StatusCode::OK).body;
    assert!(matches.as_array().unwrap().is_empty());
    let scores = setup.get("/match-teams").await.status(StatusCode::OK).body;
    assert!(scores.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_updating_match_changes_team_statistics() {
    let setup = TestSetupBuilder::new().build();
    let lions = setup.create_team("Lions").await;
    let tigers = setup.create_team("Tigers").await;
    let bears = setup.create_team("Bears").await;
    let cup = setup.create_competition("Cup").await;
    let match_id = setup.play_match(cup, (lions, 3), (tigers, 1)).await;

    setup
        .put(
            &format!("/matches/{}", match_id),
            json!({
                "datetime": "2024-04-20T16:00:00Z",
                "location": "City Stadium",
                "duration_minutes": 90,
                "competition_id": cup,
                "team1_id": lions,
                "team1_score": 0,
                "team2_id": bears,
                "team2_score": 2
            }),
            None,
        )
        .await
        .status(StatusCode::OK);

    let lions_stats = setup
        .get(&format!("/teams/{}/stats", lions))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(lions_stats["win_percentage"], 0.0);
    let tigers_stats = setup
        .get(&format!("/teams/{}/stats", tigers))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(tigers_stats["competitions_participated"], 0);
    let bears_stats = setup
        .get(&format!("/teams/{}/stats", bears))
        .await
        .status(StatusCode::OK)
        .body;
    assert_eq!(bears_stats["win_percentage"], 100.0);
}

#[tokio::test]
async fn test_coach_reschedules_training() {
    let setup = TestSetupBuilder::new().build();
    let user = setup.create_user("a@club.test", 25, None).await;
    let sensor = setup.create_sensor(120).await;
    let training = setup.train("2024-03-01T18:30:00Z", user, sensor, 110).await;
    let moved = json!({
        "datetime": "2024-03-05T07:00:00Z",
        "location": "Park",
        "duration_minutes": 40
    });

    setup
        .put(&format!("/trainings/{}", training), moved.clone(), None)
        .await
        .status(StatusCode::FORBIDDEN);
    setup
        .put(&format!("/trainings/{}", training), moved, Some("coach"))
        .await
        .status(StatusCode::OK);

    let calendar = setup
        .get("/trainings/calendar/2024/3")
        .await
        .status(StatusCode::OK)
        .body;
    assert!(calendar["days"][0]["trainings"]
        .as_array()
        .unwrap()
        .is_empty());
    assert_eq!(calendar["days"][4]["trainings"][0]["location"], "Park");
}
