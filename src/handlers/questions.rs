// src/handlers/questions.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, NewQuestion, Question, UpdateQuestionRequest},
    services::csv_import::parse_questions_csv,
    utils::jwt::Claims,
};

/// Inserts one question.
pub(crate) async fn insert_question<'e, E>(
    executor: E,
    question: &NewQuestion,
) -> Result<Question, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (text, topic, difficulty, time_required)
        VALUES ($1, $2, $3, $4)
        RETURNING id, text, topic, difficulty, time_required
        "#,
    )
    .bind(&question.text)
    .bind(&question.topic)
    .bind(question.difficulty)
    .bind(question.time_required)
    .fetch_one(executor)
    .await
}

/// Loads the whole question bank, ordered by id.
pub(crate) async fn fetch_all_questions<'e, E>(executor: E) -> Result<Vec<Question>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Question>(
        "SELECT id, text, topic, difficulty, time_required FROM questions ORDER BY id",
    )
    .fetch_all(executor)
    .await
}

/// Lists every question in the bank.
pub async fn list_questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = fetch_all_questions(&pool).await.map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT id, text, topic, difficulty, time_required FROM questions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

fn non_blank(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("Missing fields: {}", field)));
    }
    Ok(value.to_string())
}

/// Creates a new question.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    claims.require_admin()?;
    payload.validate()?;

    let new_question = NewQuestion {
        text: non_blank("text", &payload.text)?,
        topic: non_blank("topic", &payload.topic)?,
        difficulty: payload.difficulty,
        time_required: payload.time_required,
    };

    let question = insert_question(&pool, &new_question).await.map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Updates the provided fields of a question.
/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    claims.require_admin()?;
    payload.validate()?;

    let text = payload.text.as_deref().map(|t| non_blank("text", t)).transpose()?;
    let topic = payload.topic.as_deref().map(|t| non_blank("topic", t)).transpose()?;

    if !payload.is_empty() {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
        let mut separated = builder.separated(", ");

        if let Some(text) = text {
            separated.push("text = ");
            separated.push_bind_unseparated(text);
        }

        if let Some(topic) = topic {
            separated.push("topic = ");
            separated.push_bind_unseparated(topic);
        }

        if let Some(difficulty) = payload.difficulty {
            separated.push("difficulty = ");
            separated.push_bind_unseparated(difficulty);
        }

        if let Some(time_required) = payload.time_required {
            separated.push("time_required = ");
            separated.push_bind_unseparated(time_required);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        builder.build().execute(&pool).await.map_err(|e| {
            tracing::error!("Failed to update question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    }

    get_question(State(pool), Path(id)).await
}

/// Deletes a question and, through the foreign key, every record that used it.
/// Admin only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    claims.require_admin()?;

    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Imports questions from an uploaded CSV sheet.
/// Admin only.
///
/// Invalid rows are reported and skipped; valid rows are inserted independently.
pub async fn bulk_import(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    claims.require_admin()?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
            upload = Some((file_name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) = upload.ok_or(AppError::BadRequest("No file uploaded.".to_string()))?;

    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        return Err(AppError::BadRequest("Please upload a CSV file.".to_string()));
    }

    let content = String::from_utf8(bytes)
        .map_err(|e| AppError::BadRequest(format!("Error processing file: {e}")))?;

    let mut plan = parse_questions_csv(&content)
        .map_err(|e| AppError::BadRequest(format!("Error processing file: {e}")))?;

    let mut created = 0usize;
    for (row_num, question) in &plan.rows {
        match insert_question(&pool, question).await {
            Ok(_) => created += 1,
            Err(e) => {
                tracing::warn!("Bulk import row {} failed: {:?}", row_num, e);
                plan.errors.push(format!("Row {}: {}", row_num, e));
            }
        }
    }

    tracing::info!(
        created,
        rejected = plan.errors.len(),
        "Bulk question import finished"
    );

    let mut body = json!({
        "success": true,
        "created": created,
        "total_rows_processed": plan.total_rows,
    });
    if !plan.errors.is_empty() {
        body["errors"] = json!(plan.reported_errors());
    }

    Ok(Json(body))
}
