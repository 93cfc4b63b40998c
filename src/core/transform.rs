//! Row-level conversions and the grouped summation behind a report.

use crate::domain::model::{AggregateKey, EnrichedRecord, Record, ReportRow, Totals};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

pub const OUTPUT_DATE_FORMAT: &str = "%Y/%m/%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// Month-first comes before day-first, so "01/05/2021" is January 5th.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%Y-%b-%d",
];

/// Infer the format of a date string and return the calendar date it names.
///
/// Time-of-day and offsets are accepted and dropped.
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    let datetimes = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date());
    let dates = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok());

    // %Y also accepts one or two digits, so "01/05/21" would otherwise be year 1.
    datetimes
        .chain(dates)
        .find(|d| (1000..=9999).contains(&d.year()))
        .or_else(|| parse_compact_date(trimmed))
}

// YYYYMMDD
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// "2.50%" -> 0.025. The value is not range-checked.
pub fn parse_ctr(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
}

/// `impressions × fraction`, rounded half-to-even.
pub fn actual_clicks(row: usize, impressions: i64, fraction: f64) -> Result<i64> {
    let clicks = (impressions as f64 * fraction).round_ties_even();
    if !clicks.is_finite() || clicks.abs() >= i64::MAX as f64 {
        return Err(EtlError::ClicksOverflowError {
            row,
            impressions,
            fraction,
        });
    }
    Ok(clicks as i64)
}

/// Convert one input row; `row` is 1-based and only used in error messages.
pub fn enrich_record(row: usize, record: Record, country_code: String) -> Result<EnrichedRecord> {
    let date = parse_report_date(&record.date).ok_or_else(|| EtlError::InvalidDateError {
        row,
        value: record.date.clone(),
    })?;

    let fraction = parse_ctr(&record.ctr_percentage)
        .map(|percent| percent / 100.0)
        .ok_or_else(|| EtlError::InvalidCtrError {
            row,
            value: record.ctr_percentage.clone(),
        })?;

    let actual_clicks = actual_clicks(row, record.impressions, fraction)?;

    Ok(EnrichedRecord {
        date,
        country_code,
        impressions: record.impressions,
        actual_clicks,
    })
}

/// Sum impressions and clicks per (date, country), ascending by key.
pub fn aggregate<I>(records: I) -> Result<Vec<ReportRow>>
where
    I: IntoIterator<Item = EnrichedRecord>,
{
    let mut groups: BTreeMap<AggregateKey, Totals> = BTreeMap::new();

    for record in records {
        let totals = groups.entry(record.key()).or_default();
        totals.impressions = totals
            .impressions
            .checked_add(record.impressions)
            .ok_or_else(|| overflow(&record, "impressions"))?;
        totals.actual_clicks = totals
            .actual_clicks
            .checked_add(record.actual_clicks)
            .ok_or_else(|| overflow(&record, "actual clicks"))?;
    }

    Ok(groups
        .into_iter()
        .map(|(key, totals)| ReportRow {
            date: key.date.format(OUTPUT_DATE_FORMAT).to_string(),
            country_code: key.country_code,
            impressions: totals.impressions,
            actual_clicks: totals.actual_clicks,
        })
        .collect())
}

fn overflow(record: &EnrichedRecord, column: &str) -> EtlError {
    EtlError::ProcessingError {
        message: format!(
            "{} total for {} {} exceeds the 64-bit range",
            column,
            record.date.format(OUTPUT_DATE_FORMAT),
            record.country_code
        ),
    }
}

/// Header-less CSV, `\n` terminated.
pub fn serialize_rows(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}
