// src/handlers/admin.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::{
        auth::USER_COLUMNS,
        interview::{SESSION_SELECT, fetch_records, fetch_user_sessions},
    },
    models::{
        interview::{
            CandidateAnswer, CandidateDetail, CandidateSession, CandidateSummary, InterviewSession,
            LatestSession,
        },
        user::User,
    },
    services::analytics::{RecordOutcome, aggregate, mean},
};

async fn find_candidate<'e, E>(executor: E, id: i64) -> Result<User, AppError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 AND role = 'candidate'",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::NotFound("Candidate not found.".to_string()))
}

/// Aggregate score and miss statistics over every session.
/// Admin only.
pub async fn analytics(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let scores: Vec<Option<f64>> = sqlx::query_scalar("SELECT score FROM interview_sessions")
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load session scores: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let records = sqlx::query_as::<_, RecordOutcome>(
        r#"
        SELECT sq.question_id, q.topic, sq.is_correct
        FROM session_questions sq
        JOIN questions q ON q.id = sq.question_id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load session records: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(aggregate(&scores, &records)))
}

/// Lists candidates, newest first, with a summary of their sessions.
/// Admin only.
pub async fn list_candidates(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let candidates = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE role = 'candidate' ORDER BY created_at DESC, id DESC",
        USER_COLUMNS
    ))
    .fetch_all(&pool)
    .await?;

    let sessions = sqlx::query_as::<_, InterviewSession>(&format!(
        "{} WHERE u.role = 'candidate' ORDER BY s.start_time DESC, s.id DESC",
        SESSION_SELECT
    ))
    .fetch_all(&pool)
    .await?;

    let mut by_user: HashMap<i64, Vec<InterviewSession>> = HashMap::new();
    for session in sessions {
        by_user.entry(session.user_id).or_default().push(session);
    }

    let summaries: Vec<CandidateSummary> = candidates
        .into_iter()
        .map(|candidate| {
            let sessions = by_user.remove(&candidate.id).unwrap_or_default();
            CandidateSummary {
                id: candidate.id,
                username: candidate.username,
                email: candidate.email,
                date_joined: candidate.created_at,
                has_completed_interview: candidate.has_completed_interview,
                is_blocked_from_interview: candidate.is_blocked_from_interview,
                total_sessions: sessions.len(),
                average_score: mean(sessions.iter().filter_map(|s| s.score)),
                latest_session: sessions.first().map(|s| LatestSession {
                    id: s.id,
                    score: s.score,
                    start_time: s.start_time,
                    end_time: s.end_time,
                }),
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// Full interview history of one candidate.
/// Admin only.
pub async fn candidate_detail(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let candidate = find_candidate(&pool, id).await?;

    let sessions = fetch_user_sessions(&pool, candidate.id).await?;
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let records = fetch_records(&pool, &ids).await?;

    let average_score = mean(sessions.iter().filter_map(|s| s.score));

    let sessions: Vec<CandidateSession> = sessions
        .into_iter()
        .map(|session| {
            let own: Vec<_> = records
                .iter()
                .filter(|r| r.session_id == session.id)
                .collect();

            CandidateSession {
                id: session.id,
                score: session.score,
                start_time: session.start_time,
                end_time: session.end_time,
                total_questions: own.len(),
                correct_answers: own.iter().filter(|r| r.is_correct == Some(true)).count(),
                average_time: mean(own.iter().filter_map(|r| r.response_time.map(|t| t as f64))),
                questions: own
                    .iter()
                    .map(|r| CandidateAnswer {
                        question_text: r.text.clone(),
                        question_topic: r.topic.clone(),
                        question_difficulty: r.difficulty,
                        response: r.response.clone(),
                        is_correct: r.is_correct,
                        response_time: r.response_time,
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(Json(CandidateDetail {
        id: candidate.id,
        username: candidate.username,
        email: candidate.email,
        date_joined: candidate.created_at,
        has_completed_interview: candidate.has_completed_interview,
        is_blocked_from_interview: candidate.is_blocked_from_interview,
        total_sessions: sessions.len(),
        average_score,
        sessions,
    }))
}

/// Clears both gating flags so the candidate may start a new session.
/// Admin only.
pub async fn unblock_candidate(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET has_completed_interview = FALSE, is_blocked_from_interview = FALSE
        WHERE id = $1 AND role = 'candidate'
        "#,
    )
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to unblock candidate: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Candidate not found.".to_string()));
    }

    tracing::info!(candidate_id = id, "Candidate unblocked");

    Ok(Json(json!({
        "success": true,
        "message": "Candidate unblocked and can take interview again."
    })))
}

/// Deletes every session of a candidate and blocks them until unblocked.
/// Admin only.
pub async fn remove_candidate_history(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let candidate = find_candidate(&mut *tx, id).await?;

    sqlx::query(
        r#"
        DELETE FROM session_questions
        WHERE session_id IN (SELECT id FROM interview_sessions WHERE user_id = $1)
        "#,
    )
    .bind(candidate.id)
    .execute(&mut *tx)
    .await?;

    let removed = sqlx::query("DELETE FROM interview_sessions WHERE user_id = $1")
        .bind(candidate.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query(
        r#"
        UPDATE users
        SET has_completed_interview = FALSE, is_blocked_from_interview = TRUE
        WHERE id = $1
        "#,
    )
    .bind(candidate.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        candidate_id = id,
        removed_sessions = removed,
        "Candidate interview history removed"
    );

    Ok(Json(json!({
        "success": true,
        "removed_sessions": removed,
        "message": "All interview records for candidate removed. Candidate is now blocked until admin unblocks."
    })))
}
