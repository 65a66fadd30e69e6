// src/handlers/interview.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    config::Config,
    error::AppError,
    handlers::{auth::find_user, questions::fetch_all_questions},
    models::interview::{
        InterviewSession, SessionQuestionRow, SessionView, StartSessionResponse,
        SubmitAnswersRequest, SubmitAnswersResponse,
    },
    services::{
        scoring::{is_correct, session_score},
        selection::SessionSelector,
    },
    utils::jwt::Claims,
};

pub(crate) const SESSION_SELECT: &str = r#"
    SELECT s.id, s.user_id, u.username, s.start_time, s.end_time, s.score
    FROM interview_sessions s
    JOIN users u ON u.id = s.user_id
"#;

/// Sessions owned by `user_id`, newest first.
pub(crate) async fn fetch_user_sessions<'e, E>(
    executor: E,
    user_id: i64,
) -> Result<Vec<InterviewSession>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, InterviewSession>(&format!(
        "{} WHERE s.user_id = $1 ORDER BY s.start_time DESC, s.id DESC",
        SESSION_SELECT
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn fetch_session<'e, E>(
    executor: E,
    session_id: i64,
) -> Result<Option<InterviewSession>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, InterviewSession>(&format!("{} WHERE s.id = $1", SESSION_SELECT))
        .bind(session_id)
        .fetch_optional(executor)
        .await
}

/// Question records of the given sessions, in the order they were created.
pub(crate) async fn fetch_records<'e, E>(
    executor: E,
    session_ids: &[i64],
) -> Result<Vec<SessionQuestionRow>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    if session_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Use QueryBuilder for dynamic IN clause
    let mut query_builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            sq.id, sq.session_id, sq.response, sq.response_time, sq.is_correct,
            q.id AS question_id, q.text, q.topic, q.difficulty, q.time_required
        FROM session_questions sq
        JOIN questions q ON q.id = sq.question_id
        WHERE sq.session_id IN ("#,
    );

    let mut separated = query_builder.separated(",");
    for id in session_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY sq.id");

    query_builder
        .build_query_as::<SessionQuestionRow>()
        .fetch_all(executor)
        .await
}

/// Lists the caller's sessions with their question records.
pub async fn list_sessions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let sessions = fetch_user_sessions(&pool, claims.user_id()?).await?;
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let records = fetch_records(&pool, &ids).await?;

    let views: Vec<SessionView> = sessions
        .into_iter()
        .map(|s| SessionView::new(s, &records))
        .collect();

    Ok(Json(views))
}

/// One of the caller's sessions. Other users' sessions are reported as missing.
pub async fn get_session(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = fetch_session(&pool, id)
        .await?
        .filter(|s| claims.user_id().is_ok_and(|uid| uid == s.user_id))
        .ok_or(AppError::NotFound("Session not found.".to_string()))?;

    let records = fetch_records(&pool, &[session.id]).await?;
    Ok(Json(SessionView::new(session, &records)))
}

/// Starts a new interview session for the caller.
///
/// * Rejects candidates who already completed or were blocked.
/// * Picks the questions with `SessionSelector`.
/// * Persists the session and one empty record per question in a single transaction.
pub async fn start_session(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let user = find_user(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !user.may_start_interview() {
        return Err(AppError::PreconditionFailed(
            "You are not allowed to take another interview at this time.".to_string(),
        ));
    }

    let bank = fetch_all_questions(&pool).await.map_err(|e| {
        tracing::error!("Failed to load question bank: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if bank.is_empty() {
        return Err(AppError::PreconditionFailed(
            "No questions available.".to_string(),
        ));
    }

    let mut rng = match config.selection_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let selected = SessionSelector::default().select(&bank, &mut rng);

    let mut tx = pool.begin().await?;

    let session_id: i64 = sqlx::query_scalar(
        "INSERT INTO interview_sessions (user_id, start_time) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    for question in &selected {
        sqlx::query("INSERT INTO session_questions (session_id, question_id) VALUES ($1, $2)")
            .bind(session_id)
            .bind(question.id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        session_id,
        user_id,
        questions = selected.len(),
        "Interview session started"
    );

    Ok(Json(StartSessionResponse {
        session_id,
        questions: selected,
    }))
}

/// Records the caller's answers, closes the session and stores its score.
///
/// Answers for questions that are not part of the session are ignored.
pub async fn submit_answers(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut tx = pool.begin().await?;

    let session_id: i64 =
        sqlx::query_scalar("SELECT id FROM interview_sessions WHERE id = $1 AND user_id = $2")
            .bind(req.session_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("Session not found.".to_string()))?;

    for answer in &req.answers {
        sqlx::query(
            r#"
            UPDATE session_questions
            SET response = $1, response_time = $2, is_correct = $3
            WHERE session_id = $4 AND question_id = $5
            "#,
        )
        .bind(&answer.response)
        .bind(answer.response_time.unwrap_or(0))
        .bind(is_correct(answer.response.as_deref()))
        .bind(session_id)
        .bind(answer.question_id)
        .execute(&mut *tx)
        .await?;
    }

    let score = session_score(&req.answers);

    sqlx::query("UPDATE interview_sessions SET end_time = $1, score = $2 WHERE id = $3")
        .bind(Utc::now())
        .bind(score)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

    // Completion is recorded regardless of score; admins are never gated.
    sqlx::query(
        "UPDATE users SET has_completed_interview = TRUE WHERE id = $1 AND role = 'candidate'",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(session_id, user_id, score, "Interview session submitted");

    Ok(Json(SubmitAnswersResponse {
        success: true,
        score,
    }))
}

/// Full session report, visible to its owner and to admins.
pub async fn session_summary(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = fetch_session(&pool, session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found.".to_string()))?;

    if session.user_id != claims.user_id()? && !claims.is_admin() {
        return Err(AppError::Forbidden("Not authorized.".to_string()));
    }

    let records = fetch_records(&pool, &[session.id]).await?;
    Ok(Json(SessionView::new(session, &records)))
}
