//! ISO 3166 reference tables and the subdivision-to-country lookup.
//!
//! Tables are loaded once at startup, either from the copies compiled into the
//! binary or from user-supplied CSV files, and are read-only afterwards.

use crate::domain::model::CountryLookup;
use crate::domain::ports::ReferenceData;
use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const EMBEDDED_SUBDIVISIONS: &str = include_str!("../../data/subdivisions.csv");
const EMBEDDED_COUNTRIES: &str = include_str!("../../data/countries.csv");

#[derive(Debug, Deserialize)]
struct SubdivisionRow {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    alpha_2: String,
    alpha_3: String,
}

/// In-memory subdivision and country indexes, keyed by lowercased text.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    subdivisions: HashMap<String, String>,
    countries: HashMap<String, String>,
}

impl ReferenceTables {
    /// Tables built from the data compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::load(None, None)
    }

    /// Tables from optional override files; a missing override falls back to the
    /// embedded table.
    pub fn load(subdivisions: Option<&Path>, countries: Option<&Path>) -> Result<Self> {
        let (subdivisions, subdivisions_name) =
            open_table(subdivisions, EMBEDDED_SUBDIVISIONS, "embedded subdivisions")?;
        let (countries, countries_name) =
            open_table(countries, EMBEDDED_COUNTRIES, "embedded countries")?;

        let tables = Self::from_readers(subdivisions, &subdivisions_name, countries, &countries_name)?;
        tracing::debug!(
            "Reference tables ready: {} subdivision keys, {} countries",
            tables.subdivisions.len(),
            tables.countries.len()
        );
        Ok(tables)
    }

    pub fn from_readers<S: Read, C: Read>(
        subdivisions: S,
        subdivisions_name: &str,
        countries: C,
        countries_name: &str,
    ) -> Result<Self> {
        let mut tables = Self::default();
        tables.index_subdivisions(subdivisions, subdivisions_name)?;
        tables.index_countries(countries, countries_name)?;
        Ok(tables)
    }

    fn index_subdivisions<R: Read>(&mut self, reader: R, source_name: &str) -> Result<()> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut short_names = Vec::new();
        for (idx, row) in csv_reader.deserialize::<SubdivisionRow>().enumerate() {
            let row = row.map_err(|e| reference_error(source_name, format!("row {}: {}", idx + 2, e)))?;

            let alpha2 = match row.code.split_once('-') {
                Some((country, local)) if is_alpha_code(country, 2) && !local.is_empty() => country,
                _ => {
                    return Err(reference_error(
                        source_name,
                        format!("row {}: '{}' is not an ISO 3166-2 code", idx + 2, row.code),
                    ))
                }
            };
            if row.name.is_empty() {
                return Err(reference_error(
                    source_name,
                    format!("row {}: subdivision '{}' has no name", idx + 2, row.code),
                ));
            }

            // First entry wins when two subdivisions share a name.
            self.subdivisions
                .entry(row.name.to_lowercase())
                .or_insert_with(|| alpha2.to_string());
            self.subdivisions
                .entry(row.code.to_lowercase())
                .or_insert_with(|| alpha2.to_string());

            // "Barcelona [Barcelona]", "Wales [Cymru GB-CYM]"
            if let Some((short, _)) = row.name.split_once(" [") {
                if !short.trim().is_empty() {
                    short_names.push((short.trim().to_lowercase(), alpha2.to_string()));
                }
            }
        }

        // Short forms never shadow a full name from any row.
        for (short, alpha2) in short_names {
            self.subdivisions.entry(short).or_insert(alpha2);
        }
        Ok(())
    }

    fn index_countries<R: Read>(&mut self, reader: R, source_name: &str) -> Result<()> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        for (idx, row) in csv_reader.deserialize::<CountryRow>().enumerate() {
            let row = row.map_err(|e| reference_error(source_name, format!("row {}: {}", idx + 2, e)))?;

            if !is_alpha_code(&row.alpha_2, 2) || !is_alpha_code(&row.alpha_3, 3) {
                return Err(reference_error(
                    source_name,
                    format!(
                        "row {}: '{}'/'{}' are not uppercase alpha-2/alpha-3 codes",
                        idx + 2,
                        row.alpha_2,
                        row.alpha_3
                    ),
                ));
            }
            if self
                .countries
                .insert(row.alpha_2.to_lowercase(), row.alpha_3)
                .is_some()
            {
                return Err(reference_error(
                    source_name,
                    format!("row {}: duplicate alpha-2 code '{}'", idx + 2, row.alpha_2),
                ));
            }
        }
        Ok(())
    }
}

impl ReferenceData for ReferenceTables {
    fn resolve_subdivision(&self, name: &str) -> Option<&str> {
        self.subdivisions.get(&name.to_lowercase()).map(String::as_str)
    }

    fn resolve_country(&self, alpha2: &str) -> Option<&str> {
        self.countries.get(&alpha2.to_lowercase()).map(String::as_str)
    }
}

/// Resolve a subdivision name (or ISO 3166-2 code) to its country's alpha-3 code.
pub fn lookup_country_code<R: ReferenceData + ?Sized>(reference: &R, name: &str) -> CountryLookup {
    reference
        .resolve_subdivision(name)
        .and_then(|alpha2| reference.resolve_country(alpha2))
        .map(|alpha3| CountryLookup::Resolved(alpha3.to_string()))
        .unwrap_or(CountryLookup::NotFound)
}

fn open_table(
    path: Option<&Path>,
    embedded: &'static str,
    embedded_name: &str,
) -> Result<(Box<dyn Read>, String)> {
    match path {
        Some(path) => {
            let name = path.display().to_string();
            let file = std::fs::File::open(path).map_err(|e| reference_error(&name, e.to_string()))?;
            Ok((Box::new(file), name))
        }
        None => Ok((Box::new(embedded.as_bytes()), embedded_name.to_string())),
    }
}

fn is_alpha_code(code: &str, len: usize) -> bool {
    code.len() == len && code.chars().all(|c| c.is_ascii_uppercase())
}

fn reference_error(source_name: &str, message: String) -> EtlError {
    EtlError::ReferenceError {
        source_name: source_name.to_string(),
        message,
    }
}
