use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder country code for subdivisions that cannot be resolved.
pub const UNKNOWN_COUNTRY_CODE: &str = "XXX";

/// One input row. Columns are positional: the input file has no header.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub date: String,
    pub subdivision_name: String,
    pub impressions: i64,
    pub ctr_percentage: String,
}

/// Outcome of resolving a subdivision to an ISO 3166-1 alpha-3 code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    Resolved(String),
    NotFound,
}

impl CountryLookup {
    pub fn code(&self) -> &str {
        match self {
            CountryLookup::Resolved(code) => code,
            CountryLookup::NotFound => UNKNOWN_COUNTRY_CODE,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            CountryLookup::Resolved(code) => code,
            CountryLookup::NotFound => UNKNOWN_COUNTRY_CODE.to_string(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CountryLookup::Resolved(_))
    }
}

/// A row after country resolution, date normalization and click computation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub date: NaiveDate,
    pub country_code: String,
    pub impressions: i64,
    pub actual_clicks: i64,
}

impl EnrichedRecord {
    pub fn key(&self) -> AggregateKey {
        AggregateKey {
            date: self.date,
            country_code: self.country_code.clone(),
        }
    }
}

/// Grouping key for output rows. Orders by date, then country code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregateKey {
    pub date: NaiveDate,
    pub country_code: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub impressions: i64,
    pub actual_clicks: i64,
}

/// One serialized output line, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub country_code: String,
    pub impressions: i64,
    pub actual_clicks: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub input_rows: usize,
    pub unresolved_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_sentinel() {
        assert_eq!(CountryLookup::NotFound.code(), "XXX");
        assert_eq!(CountryLookup::Resolved("USA".into()).into_code(), "USA");
        assert!(!CountryLookup::NotFound.is_resolved());
    }

    #[test]
    fn test_keys_order_by_date_then_country() {
        let day = |d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap();
        let mut keys = vec![
            AggregateKey { date: day(6), country_code: "AFG".into() },
            AggregateKey { date: day(5), country_code: "USA".into() },
            AggregateKey { date: day(5), country_code: "DEU".into() },
        ];
        keys.sort();
        let codes: Vec<_> = keys.iter().map(|k| k.country_code.as_str()).collect();
        assert_eq!(codes, vec!["DEU", "USA", "AFG"]);
    }
}
