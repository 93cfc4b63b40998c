use crate::core::Pipeline;
use crate::utils::error::{EtlError, Result};
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Run extract, transform and load in order.
    ///
    /// Extract failures come back as [`EtlError::LoadFailed`]; anything after that
    /// as [`EtlError::TransformFailed`]. Nothing is written unless transform succeeds.
    pub fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting report generation");

        // Extract
        let raw_data = self
            .pipeline
            .extract()
            .map_err(|e| EtlError::LoadFailed(Box::new(e)))?;
        tracing::info!(
            "Extracted {} records in {:.1}ms",
            raw_data.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        // Transform
        let phase = Instant::now();
        let report = self
            .pipeline
            .transform(raw_data)
            .map_err(|e| EtlError::TransformFailed(Box::new(e)))?;
        tracing::info!(
            "Aggregated {} records into {} rows in {:.1}ms",
            report.input_rows,
            report.rows.len(),
            phase.elapsed().as_secs_f64() * 1000.0
        );

        // Load
        let phase = Instant::now();
        let output_path = self
            .pipeline
            .load(report)
            .map_err(|e| EtlError::TransformFailed(Box::new(e)))?;
        tracing::info!(
            "Output saved to {} in {:.1}ms (total {:.1}ms)",
            output_path,
            phase.elapsed().as_secs_f64() * 1000.0,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(output_path)
    }
}
