// src/services/scoring.rs

use crate::models::interview::SubmittedAnswer;

/// An answer counts as correct when it carries any text at all.
/// Placeholder rule until real answer evaluation exists.
pub fn is_correct(response: Option<&str>) -> bool {
    response.is_some_and(|r| !r.is_empty())
}

/// Percentage of submitted answers that carry a response.
///
/// The denominator is the number of submitted answers, not the number of questions in the
/// session, so a partial submission is scored against itself.
pub fn session_score(answers: &[SubmittedAnswer]) -> f64 {
    let answered = answers
        .iter()
        .filter(|a| is_correct(a.response.as_deref()))
        .count();

    answered as f64 / answers.len().max(1) as f64 * 100.0
}
