use crate::core::transform::{aggregate, enrich_record, serialize_rows};
use crate::core::{ConfigProvider, Pipeline, Record, ReferenceData, Report, Storage};
use crate::reference::lookup_country_code;
use crate::utils::encoding::decode_input;
use crate::utils::error::{EtlError, Result};
use std::path::Path;

const INPUT_COLUMNS: usize = 4;

/// Impression CSV in, per-day per-country totals out.
pub struct ReportPipeline<S: Storage, C: ConfigProvider, R: ReferenceData> {
    storage: S,
    config: C,
    reference: R,
}

impl<S: Storage, C: ConfigProvider, R: ReferenceData> ReportPipeline<S, C, R> {
    pub fn new(storage: S, config: C, reference: R) -> Self {
        Self {
            storage,
            config,
            reference,
        }
    }

    /// `<output dir>/<prefix><input file name>`
    pub fn output_path(&self) -> String {
        let input = self.config.input_file();
        let file_name = Path::new(input)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());

        Path::new(self.config.output_dir())
            .join(format!("{}{}", self.config.output_prefix(), file_name))
            .to_string_lossy()
            .into_owned()
    }
}

/// Parse header-less, four-column CSV text into records.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() != INPUT_COLUMNS {
            return Err(EtlError::MalformedRowError {
                row: idx + 1,
                found: row.len(),
            });
        }
        records.push(row.deserialize::<Record>(None)?);
    }
    Ok(records)
}

impl<S: Storage, C: ConfigProvider, R: ReferenceData> Pipeline for ReportPipeline<S, C, R> {
    fn extract(&self) -> Result<Vec<Record>> {
        let input = self.config.input_file();
        tracing::debug!("Reading input file: {}", input);

        let bytes = self.storage.read_file(input)?;
        let (text, encoding) = decode_input(&bytes, input)?;
        tracing::debug!("Decoded {} bytes as {:?}", bytes.len(), encoding);

        parse_records(&text)
    }

    fn transform(&self, data: Vec<Record>) -> Result<Report> {
        let input_rows = data.len();
        let mut unresolved_rows = 0;
        let mut enriched = Vec::with_capacity(input_rows);

        for (idx, record) in data.into_iter().enumerate() {
            let lookup = lookup_country_code(&self.reference, &record.subdivision_name);
            if !lookup.is_resolved() {
                tracing::debug!(
                    "Row {}: no country found for subdivision '{}'",
                    idx + 1,
                    record.subdivision_name
                );
                unresolved_rows += 1;
            }
            enriched.push(enrich_record(idx + 1, record, lookup.into_code())?);
        }

        if unresolved_rows > 0 {
            tracing::warn!(
                "{} of {} rows have an unrecognized subdivision and were coded XXX",
                unresolved_rows,
                input_rows
            );
        }

        Ok(Report {
            rows: aggregate(enriched)?,
            input_rows,
            unresolved_rows,
        })
    }

    fn load(&self, report: Report) -> Result<String> {
        let output_path = self.output_path();
        let data = serialize_rows(&report.rows)?;

        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            report.rows.len(),
            data.len(),
            output_path
        );
        self.storage.write_file(&output_path, &data)?;

        Ok(output_path)
    }
}
