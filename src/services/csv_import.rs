// src/services/csv_import.rs

use crate::{
    config::{MAX_IMPORT_ERRORS, MAX_TIME_REQUIRED_SECS},
    models::question::{Difficulty, NewQuestion},
};

const REQUIRED_FIELDS: [&str; 4] = ["text", "topic", "difficulty", "time_required"];

/// Outcome of validating an uploaded question sheet.
#[derive(Debug, Default)]
pub struct ImportPlan {
    /// Valid rows with their 1-based sheet row number (the header is row 1).
    pub rows: Vec<(usize, NewQuestion)>,
    pub errors: Vec<String>,
    pub total_rows: usize,
}

impl ImportPlan {
    /// Errors as reported to the client: the first few, plus a count of the rest.
    pub fn reported_errors(&self) -> Vec<String> {
        truncate_errors(&self.errors)
    }
}

pub fn truncate_errors(errors: &[String]) -> Vec<String> {
    let mut reported: Vec<String> = errors.iter().take(MAX_IMPORT_ERRORS).cloned().collect();
    if errors.len() > MAX_IMPORT_ERRORS {
        reported.push(format!(
            "... and {} more errors",
            errors.len() - MAX_IMPORT_ERRORS
        ));
    }
    reported
}

/// Parses a CSV document with a `text,topic,difficulty,time_required` header.
///
/// Bad rows are collected as messages and never abort the parse. Only an unreadable header
/// fails the whole document.
pub fn parse_questions_csv(data: &str) -> Result<ImportPlan, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let columns: Vec<Option<usize>> = REQUIRED_FIELDS.iter().map(|f| column(*f)).collect();

    let mut plan = ImportPlan::default();

    for (index, record) in reader.records().enumerate() {
        let row_num = index + 2;
        plan.total_rows += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                plan.errors.push(format!("Row {}: {}", row_num, e));
                continue;
            }
        };

        let values: Vec<&str> = columns
            .iter()
            .map(|idx| idx.and_then(|i| record.get(i)).unwrap_or("").trim())
            .collect();

        match validate_row(&values) {
            Ok(question) => plan.rows.push((row_num, question)),
            Err(msg) => plan.errors.push(format!("Row {}: {}", row_num, msg)),
        }
    }

    Ok(plan)
}

/// `values` follows the order of `REQUIRED_FIELDS`.
fn validate_row(values: &[&str]) -> Result<NewQuestion, String> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_empty())
        .map(|(f, _)| *f)
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing fields: {}", missing.join(", ")));
    }

    let difficulty: Difficulty = values[2].parse()?;

    let time_required = values[3]
        .parse::<i64>()
        .map_err(|_| "time_required must be a number".to_string())?;
    if time_required <= 0 {
        return Err("time_required must be positive".to_string());
    }
    if time_required > MAX_TIME_REQUIRED_SECS {
        return Err(format!(
            "time_required must be at most {}",
            MAX_TIME_REQUIRED_SECS
        ));
    }

    Ok(NewQuestion {
        text: values[0].to_string(),
        topic: values[1].to_string(),
        difficulty,
        time_required,
    })
}
