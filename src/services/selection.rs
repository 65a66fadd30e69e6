// src/services/selection.rs

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{
    config::{SESSION_QUESTION_LIMIT, SESSION_TIME_BUDGET_SECS, TARGET_DISTRIBUTION},
    models::question::{Difficulty, Question},
};

/// Picks the question set for a new interview session.
///
/// Buckets are visited in distribution order. Each bucket contributes a random sample of up
/// to its target count, skipping any question that would overrun the time budget. A single
/// fill pass then tops the selection up from the shuffled remainder of the pool. If nothing
/// fits at all, a random sample of the pool is returned regardless of time.
pub struct SessionSelector<'a> {
    distribution: &'a [(&'a str, Difficulty, usize)],
    limit: usize,
    time_budget: i64,
}

impl Default for SessionSelector<'static> {
    fn default() -> Self {
        Self {
            distribution: &TARGET_DISTRIBUTION,
            limit: SESSION_QUESTION_LIMIT,
            time_budget: SESSION_TIME_BUDGET_SECS,
        }
    }
}

impl<'a> SessionSelector<'a> {
    #[must_use]
    pub fn new(distribution: &'a [(&'a str, Difficulty, usize)]) -> Self {
        Self {
            distribution,
            limit: SESSION_QUESTION_LIMIT,
            time_budget: SESSION_TIME_BUDGET_SECS,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_time_budget(mut self, seconds: i64) -> Self {
        self.time_budget = seconds;
        self
    }

    /// Returns the selection in the order questions were picked.
    pub fn select<R: Rng + ?Sized>(&self, pool: &[Question], rng: &mut R) -> Vec<Question> {
        let mut buckets: HashMap<(&str, Difficulty), Vec<&Question>> = HashMap::new();
        for q in pool {
            buckets
                .entry((q.topic.as_str(), q.difficulty))
                .or_default()
                .push(q);
        }

        let mut picked = Picked::default();

        for &(topic, difficulty, count) in self.distribution {
            if let Some(bucket) = buckets.get(&(topic, difficulty)) {
                let mut candidates = bucket.clone();
                let take = count.min(candidates.len());
                let (sample, _) = candidates.partial_shuffle(rng, take);

                for &q in sample.iter() {
                    if picked.len() < self.limit && picked.fits(q, self.time_budget) {
                        picked.push(q);
                    }
                }
            }
        }

        if picked.len() < self.limit {
            self.fill(pool, &mut picked, rng);
        }

        if picked.is_empty() {
            let take = self.limit.min(pool.len());
            let mut everything: Vec<&Question> = pool.iter().collect();
            let (sample, _) = everything.partial_shuffle(rng, take);
            return sample.iter().map(|q| (*q).clone()).collect();
        }

        picked.questions.into_iter().cloned().collect()
    }

    fn fill<'q, R: Rng + ?Sized>(&self, pool: &'q [Question], picked: &mut Picked<'q>, rng: &mut R) {
        let mut remaining: Vec<&Question> = pool
            .iter()
            .filter(|q| !picked.ids.contains(&q.id))
            .collect();
        remaining.shuffle(rng);

        for q in remaining {
            if picked.len() >= self.limit {
                break;
            }
            if picked.fits(q, self.time_budget) {
                picked.push(q);
            }
        }
    }
}

#[derive(Default)]
struct Picked<'q> {
    questions: Vec<&'q Question>,
    ids: HashSet<i64>,
    total_time: i64,
}

impl<'q> Picked<'q> {
    /// Overflowing totals never fit.
    fn fits(&self, q: &Question, budget: i64) -> bool {
        self.total_time
            .checked_add(q.time_required)
            .is_some_and(|total| total <= budget)
    }

    fn push(&mut self, q: &'q Question) {
        if self.ids.insert(q.id) {
            self.total_time += q.time_required;
            self.questions.push(q);
        }
    }

    fn len(&self) -> usize {
        self.questions.len()
    }

    fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
