use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Field, FieldValue, ResultSet};

pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Column headers of the output table, in order.
pub const COLUMNS: [&str; 4] = [
    Field::Title.column(),
    Field::CriticScore.column(),
    Field::AudienceScore.column(),
    Field::AvailabilityDate.column(),
];

/// One typed output row. Scores and date are `None` when coercion failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub title: String,
    pub critic_score: Option<f64>,
    pub audience_score: Option<f64>,
    pub availability_date: Option<NaiveDate>,
}

impl Row {
    pub fn is_complete(&self) -> bool {
        self.critic_score.is_some()
            && self.audience_score.is_some()
            && self.availability_date.is_some()
    }

    fn dedupe_key(&self) -> (String, Option<u64>, Option<u64>, Option<NaiveDate>) {
        (
            self.title.clone(),
            self.critic_score.map(f64::to_bits),
            self.audience_score.map(f64::to_bits),
            self.availability_date,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes rows whose every field equals an earlier row, keeping the first.
    pub fn dedupe_rows(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.dedupe_key()));
    }
}

/// What to do with null cells after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Nulls stay null.
    #[default]
    Keep,
    /// Mean-fill scores, forward-fill dates. See [`impute_missing`].
    Impute,
    /// Remove any row with a null cell. See [`drop_incomplete`].
    DropIncomplete,
}

impl NullPolicy {
    pub fn apply(self, table: &mut Table) {
        match self {
            NullPolicy::Keep => {}
            NullPolicy::Impute => impute_missing(table),
            NullPolicy::DropIncomplete => drop_incomplete(table),
        }
    }
}

/// Converts accumulated records into a typed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    date_format: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl Normalizer {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Coerces every record into a row, then drops exact duplicate rows.
    ///
    /// Pure: the same result set always yields the same table.
    pub fn finalize(&self, results: &ResultSet) -> Table {
        let rows = results
            .iter()
            .map(|record| Row {
                title: record.title().as_str().to_string(),
                critic_score: parse_score(record.get(Field::CriticScore)),
                audience_score: parse_score(record.get(Field::AudienceScore)),
                availability_date: parse_date(
                    record.get(Field::AvailabilityDate),
                    &self.date_format,
                ),
            })
            .collect();
        let mut table = Table::from_rows(rows);
        table.dedupe_rows();
        table
    }
}

/// `"87%"` -> `87.0`. Missing, unparsable and non-finite values are `None`.
pub fn parse_score(value: &FieldValue) -> Option<f64> {
    let text = value.text()?.trim();
    let number = text.strip_suffix('%').unwrap_or(text).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date(value: &FieldValue, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.text()?.trim(), format).ok()
}

/// Fills null scores with their column mean and null dates with the previous row's date.
///
/// A score column with no values at all stays null; leading null dates stay null.
pub fn impute_missing(table: &mut Table) {
    let critic_mean = column_mean(table.rows.iter().map(|row| row.critic_score));
    let audience_mean = column_mean(table.rows.iter().map(|row| row.audience_score));

    let mut previous_date = None;
    for row in &mut table.rows {
        if row.critic_score.is_none() {
            row.critic_score = critic_mean;
        }
        if row.audience_score.is_none() {
            row.audience_score = audience_mean;
        }
        match row.availability_date {
            Some(date) => previous_date = Some(date),
            None => row.availability_date = previous_date,
        }
    }
}

/// Removes every row that still has a null cell.
pub fn drop_incomplete(table: &mut Table) {
    table.rows.retain(Row::is_complete);
}

fn column_mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
