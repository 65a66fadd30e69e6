// tests/interview_tests.rs

mod common;

use std::collections::HashSet;

use common::spawn_app;
use serde_json::{Value, json};

async fn session_count(app: &common::TestApp) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM interview_sessions")
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn start_fails_on_empty_pool_without_persisting() {
    let app = spawn_app().await;
    let (_, token) = app.candidate().await;

    let response = app.post("/api/interview/start", &token, json!({})).await;
    assert_eq!(response.status().as_u16(), 412);
    assert_eq!(session_count(&app).await, 0);
}

#[tokio::test]
async fn start_builds_ten_question_session() {
    let app = spawn_app().await;
    app.seed_distribution(3, 60).await;
    let (_, token) = app.candidate().await;

    let response = app.post("/api/interview/start", &token, json!({})).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);

    let ids: HashSet<i64> = questions.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    assert_eq!(ids.len(), 10);

    let total: i64 = questions
        .iter()
        .map(|q| q["time_required"].as_i64().unwrap())
        .sum();
    assert!(total <= 900);

    // Records exist in selection order with empty answers.
    let session_id = body["session_id"].as_i64().unwrap();
    let records: Vec<(i64, Option<String>)> = sqlx::query_as(
        "SELECT question_id, response FROM session_questions WHERE session_id = $1 ORDER BY id",
    )
    .bind(session_id)
    .fetch_all(&app.pool)
    .await
    .unwrap();
    let record_ids: Vec<i64> = records.iter().map(|(id, _)| *id).collect();
    let selected_ids: Vec<i64> = questions.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    assert_eq!(record_ids, selected_ids);
    assert!(records.iter().all(|(_, r)| r.is_none()));
}

#[tokio::test]
async fn one_question_per_bucket_yields_seven() {
    let app = spawn_app().await;
    app.seed_distribution(1, 60).await;
    let (_, token) = app.candidate().await;

    let body: Value = app
        .post("/api/interview/start", &token, json!({}))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["questions"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn submit_scores_and_gates_the_candidate() {
    let app = spawn_app().await;
    app.seed_distribution(2, 60).await;
    let (_, token) = app.candidate().await;

    let started: Value = app
        .post("/api/interview/start", &token, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_i64().unwrap();
    let q1 = started["questions"][0]["id"].as_i64().unwrap();
    let q2 = started["questions"][1]["id"].as_i64().unwrap();

    let answers = json!({
        "session_id": session_id,
        "answers": [
            {"question_id": q1, "response": "x", "response_time": 30},
            {"question_id": q2, "response": "", "response_time": 10},
            {"question_id": 999_999, "response": "ignored", "response_time": 5}
        ]
    });

    let submitted = app.post("/api/interview/submit", &token, answers.clone()).await;
    assert_eq!(submitted.status().as_u16(), 200);
    let submitted: Value = submitted.json().await.unwrap();
    assert_eq!(submitted["success"], true);
    // Unmatched ids still count towards the denominator.
    let expected = 2.0 / 3.0 * 100.0;
    assert!((submitted["score"].as_f64().unwrap() - expected).abs() < 1e-9);

    let summary: Value = app
        .get(&format!("/api/interview/summary/{}", session_id), &token)
        .await
        .json()
        .await
        .unwrap();
    assert!(summary["end_time"].is_string());
    let records = summary["questions"].as_array().unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0]["is_correct"], true);
    assert_eq!(records[0]["response_time"], 30);
    assert_eq!(records[1]["is_correct"], false);
    assert!(records[2]["is_correct"].is_null());

    let me: Value = app.get("/api/auth/me", &token).await.json().await.unwrap();
    assert_eq!(me["has_completed_interview"], true);

    let again = app.post("/api/interview/start", &token, json!({})).await;
    assert_eq!(again.status().as_u16(), 412);

    // Resubmitting recomputes the same score.
    let resubmitted: Value = app
        .post("/api/interview/submit", &token, answers)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(resubmitted["score"], submitted["score"]);
}

#[tokio::test]
async fn two_answers_half_empty_scores_fifty() {
    let app = spawn_app().await;
    app.seed_distribution(2, 60).await;
    let (_, token) = app.candidate().await;

    let started: Value = app
        .post("/api/interview/start", &token, json!({}))
        .await
        .json()
        .await
        .unwrap();

    let body = json!({
        "session_id": started["session_id"],
        "answers": [
            {"question_id": started["questions"][0]["id"], "response": "x", "response_time": 30},
            {"question_id": started["questions"][1]["id"], "response": "", "response_time": 10}
        ]
    });
    let result: Value = app
        .post("/api/interview/submit", &token, body)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(result["score"], 50.0);
}

#[tokio::test]
async fn sessions_are_private_to_their_owner() {
    let app = spawn_app().await;
    app.seed_distribution(2, 60).await;
    let (_, owner) = app.candidate().await;
    let (_, other) = app.candidate().await;

    let started: Value = app
        .post("/api/interview/start", &owner, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let session_id = started["session_id"].as_i64().unwrap();

    let listed: Value = app.get("/api/interview/sessions", &owner).await.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["questions"].as_array().unwrap().len(), 10);

    let detail = app
        .get(&format!("/api/interview/sessions/{}", session_id), &other)
        .await;
    assert_eq!(detail.status().as_u16(), 404);

    let summary = app
        .get(&format!("/api/interview/summary/{}", session_id), &other)
        .await;
    assert_eq!(summary.status().as_u16(), 403);

    let admin_summary = app
        .get(&format!("/api/interview/summary/{}", session_id), &app.admin_token)
        .await;
    assert_eq!(admin_summary.status().as_u16(), 200);

    let missing = app.get("/api/interview/summary/424242", &owner).await;
    assert_eq!(missing.status().as_u16(), 404);

    let foreign_submit = app
        .post(
            "/api/interview/submit",
            &other,
            json!({"session_id": session_id, "answers": [
                {"question_id": started["questions"][0]["id"], "response": "hijack"}
            ]}),
        )
        .await;
    assert_eq!(foreign_submit.status().as_u16(), 404);

    let untouched: Option<String> =
        sqlx::query_scalar("SELECT response FROM session_questions WHERE session_id = $1 ORDER BY id LIMIT 1")
            .bind(session_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert!(untouched.is_none());
}

#[tokio::test]
async fn admin_endpoints_reject_candidates() {
    let app = spawn_app().await;
    let (_, token) = app.candidate().await;

    for path in [
        "/api/interview/admin/analytics",
        "/api/interview/admin/candidates",
    ] {
        let response = app.get(path, &token).await;
        assert_eq!(response.status().as_u16(), 403, "{}", path);
    }
}

#[tokio::test]
async fn analytics_counts_misses_per_topic() {
    let app = spawn_app().await;
    app.seed_distribution(1, 60).await;
    let (_, token) = app.candidate().await;

    let started: Value = app
        .post("/api/interview/start", &token, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let first = started["questions"][0]["id"].as_i64().unwrap();

    app.post(
        "/api/interview/submit",
        &token,
        json!({"session_id": started["session_id"], "answers": [
            {"question_id": first, "response": "answered", "response_time": 12}
        ]}),
    )
    .await;

    let report: Value = app
        .get("/api/interview/admin/analytics", &app.admin_token)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(report["total_sessions"], 1);
    assert_eq!(report["avg_score"], 100.0);

    let stats = report["topic_stats"].as_object().unwrap();
    let total: u64 = stats.values().map(|s| s["total"].as_u64().unwrap()).sum();
    let missed: u64 = stats.values().map(|s| s["missed"].as_u64().unwrap()).sum();
    assert_eq!(total, 7);
    assert_eq!(missed, 6);

    let most_missed = report["most_missed_questions"].as_array().unwrap();
    assert_eq!(most_missed.len(), 5);
    assert!(most_missed.iter().all(|m| m["question_id"] != first));
    assert!(most_missed.iter().all(|m| m["miss_count"] == 1));
}

#[tokio::test]
async fn remove_blocks_until_unblocked() {
    let app = spawn_app().await;
    app.seed_distribution(2, 60).await;
    let (candidate_id, token) = app.candidate().await;

    // Three sessions, each submitted and then unblocked by the admin.
    for _ in 0..3 {
        let started: Value = app
            .post("/api/interview/start", &token, json!({}))
            .await
            .json()
            .await
            .unwrap();
        app.post(
            "/api/interview/submit",
            &token,
            json!({"session_id": started["session_id"], "answers": []}),
        )
        .await;
        let unblocked = app
            .post(
                &format!("/api/interview/admin/candidates/{}/unblock", candidate_id),
                &app.admin_token,
                json!({}),
            )
            .await;
        assert_eq!(unblocked.status().as_u16(), 200);
    }

    let listing: Value = app
        .get("/api/interview/admin/candidates", &app.admin_token)
        .await
        .json()
        .await
        .unwrap();
    let entry = listing
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == candidate_id)
        .expect("candidate listed");
    assert_eq!(entry["total_sessions"], 3);
    assert!(entry["latest_session"]["id"].is_i64());

    let detail: Value = app
        .get(
            &format!("/api/interview/admin/candidates/{}", candidate_id),
            &app.admin_token,
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["sessions"].as_array().unwrap().len(), 3);
    assert_eq!(detail["sessions"][0]["total_questions"], 10);

    let removed = app
        .client
        .delete(app.url(&format!(
            "/api/interview/admin/candidates/{}/remove",
            candidate_id
        )))
        .bearer_auth(&app.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 200);
    let removed: Value = removed.json().await.unwrap();
    assert_eq!(removed["removed_sessions"], 3);

    assert_eq!(session_count(&app).await, 0);
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session_questions")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    let me: Value = app.get("/api/auth/me", &token).await.json().await.unwrap();
    assert_eq!(me["is_blocked_from_interview"], true);
    assert_eq!(me["has_completed_interview"], false);

    let blocked = app.post("/api/interview/start", &token, json!({})).await;
    assert_eq!(blocked.status().as_u16(), 412);

    app.post(
        &format!("/api/interview/admin/candidates/{}/unblock", candidate_id),
        &app.admin_token,
        json!({}),
    )
    .await;

    let allowed = app.post("/api/interview/start", &token, json!({})).await;
    assert_eq!(allowed.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_candidate_is_not_found() {
    let app = spawn_app().await;

    let detail = app
        .get("/api/interview/admin/candidates/987654", &app.admin_token)
        .await;
    assert_eq!(detail.status().as_u16(), 404);

    let unblock = app
        .post(
            "/api/interview/admin/candidates/987654/unblock",
            &app.admin_token,
            json!({}),
        )
        .await;
    assert_eq!(unblock.status().as_u16(), 404);
}
