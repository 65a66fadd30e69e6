// src/services/analytics.rs

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sqlx::FromRow;

/// How many questions the "most missed" list reports.
pub const MOST_MISSED_LIMIT: usize = 5;

/// Minimal projection of a session question record needed for aggregation.
#[derive(Debug, Clone, FromRow)]
pub struct RecordOutcome {
    pub question_id: i64,
    pub topic: String,
    pub is_correct: Option<bool>,
}

impl RecordOutcome {
    /// Wrong, empty and never-answered records all count as misses.
    pub fn is_miss(&self) -> bool {
        !self.is_correct.unwrap_or(false)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TopicStats {
    pub total: u64,
    pub missed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissedQuestion {
    pub question_id: i64,
    pub miss_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_sessions: usize,
    pub avg_score: f64,
    pub topic_stats: BTreeMap<String, TopicStats>,
    pub most_missed_questions: Vec<MissedQuestion>,
}

/// Arithmetic mean, or 0 for an empty input.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Builds the admin analytics report.
///
/// `scores` holds one entry per session; unscored sessions count towards `total_sessions`
/// but not towards the average. Ties in the most-missed list go to the lower question id.
pub fn aggregate(scores: &[Option<f64>], records: &[RecordOutcome]) -> AnalyticsReport {
    let mut topic_stats: BTreeMap<String, TopicStats> = BTreeMap::new();
    let mut misses: HashMap<i64, u64> = HashMap::new();

    for record in records {
        let stats = topic_stats.entry(record.topic.clone()).or_default();
        stats.total += 1;

        if record.is_miss() {
            stats.missed += 1;
            *misses.entry(record.question_id).or_insert(0) += 1;
        }
    }

    let mut most_missed: Vec<MissedQuestion> = misses
        .into_iter()
        .map(|(question_id, miss_count)| MissedQuestion {
            question_id,
            miss_count,
        })
        .collect();
    most_missed.sort_by(|a, b| {
        b.miss_count
            .cmp(&a.miss_count)
            .then(a.question_id.cmp(&b.question_id))
    });
    most_missed.truncate(MOST_MISSED_LIMIT);

    AnalyticsReport {
        total_sessions: scores.len(),
        avg_score: mean(scores.iter().flatten().copied()),
        topic_stats,
        most_missed_questions: most_missed,
    }
}
