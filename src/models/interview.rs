// src/models/interview.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::{Difficulty, Question};

/// Represents the 'interview_sessions' table joined with the owner's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InterviewSession {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub start_time: DateTime<Utc>,
    /// Set when the candidate submits.
    pub end_time: Option<DateTime<Utc>>,
    /// Percentage in 0..=100, set when the candidate submits.
    pub score: Option<f64>,
}

/// One 'session_questions' row joined with its question.
#[derive(Debug, Clone, FromRow)]
pub struct SessionQuestionRow {
    pub id: i64,
    pub session_id: i64,
    pub response: Option<String>,
    pub response_time: Option<i64>,
    pub is_correct: Option<bool>,
    pub question_id: i64,
    pub text: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub time_required: i64,
}

impl SessionQuestionRow {
    pub fn question(&self) -> Question {
        Question {
            id: self.question_id,
            text: self.text.clone(),
            topic: self.topic.clone(),
            difficulty: self.difficulty,
            time_required: self.time_required,
        }
    }
}

/// Serialized question record nested inside a session.
#[derive(Debug, Serialize)]
pub struct SessionQuestionView {
    pub id: i64,
    pub question: Question,
    pub response: Option<String>,
    pub response_time: Option<i64>,
    pub is_correct: Option<bool>,
}

impl From<&SessionQuestionRow> for SessionQuestionView {
    fn from(row: &SessionQuestionRow) -> Self {
        Self {
            id: row.id,
            question: row.question(),
            response: row.response.clone(),
            response_time: row.response_time,
            is_correct: row.is_correct,
        }
    }
}

/// Full session serialization, shared by the session detail and summary endpoints.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: i64,
    pub user: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub questions: Vec<SessionQuestionView>,
}

impl SessionView {
    pub fn new(session: InterviewSession, records: &[SessionQuestionRow]) -> Self {
        Self {
            id: session.id,
            user: session.username,
            start_time: session.start_time,
            end_time: session.end_time,
            score: session.score,
            questions: records
                .iter()
                .filter(|r| r.session_id == session.id)
                .map(SessionQuestionView::from)
                .collect(),
        }
    }
}

/// Response of `POST /start`.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: i64,
    pub questions: Vec<Question>,
}

/// A single answer inside a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub response_time: Option<i64>,
}

/// DTO for `POST /submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub session_id: i64,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswersResponse {
    pub success: bool,
    pub score: f64,
}

/// Most recent session shown in the candidate list.
#[derive(Debug, Serialize)]
pub struct LatestSession {
    pub id: i64,
    pub score: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Row of `GET /admin/candidates`.
#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub has_completed_interview: bool,
    pub is_blocked_from_interview: bool,
    pub total_sessions: usize,
    pub latest_session: Option<LatestSession>,
    pub average_score: f64,
}

/// Per-answer line in the candidate history.
#[derive(Debug, Serialize)]
pub struct CandidateAnswer {
    pub question_text: String,
    pub question_topic: String,
    pub question_difficulty: Difficulty,
    pub response: Option<String>,
    pub is_correct: Option<bool>,
    pub response_time: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CandidateSession {
    pub id: i64,
    pub score: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub average_time: f64,
    pub questions: Vec<CandidateAnswer>,
}

/// Response of `GET /admin/candidates/{id}`.
#[derive(Debug, Serialize)]
pub struct CandidateDetail {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub has_completed_interview: bool,
    pub is_blocked_from_interview: bool,
    pub total_sessions: usize,
    pub average_score: f64,
    pub sessions: Vec<CandidateSession>,
}
