pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::reference::ReferenceTables;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_file_prefix, validate_non_empty_string, validate_path, Validate,
};
use std::path::Path;
use toml_config::{TomlConfig, DEFAULT_OUTPUT_PREFIX};

#[cfg(feature = "cli")]
use clap::Parser;

/// Fully resolved settings for one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub input_file: String,
    pub output_dir: String,
    pub output_prefix: String,
    pub subdivisions_file: Option<String>,
    pub countries_file: Option<String>,
}

impl ReportSettings {
    /// Defaults: output next to the working directory, embedded reference tables.
    pub fn new(input_file: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            output_dir: ".".to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            subdivisions_file: None,
            countries_file: None,
        }
    }

    pub fn with_file_config(mut self, file: &TomlConfig) -> Self {
        self.output_dir = file.output.dir.clone();
        self.output_prefix = file.output.prefix.clone();
        self.subdivisions_file = file.reference.subdivisions.clone();
        self.countries_file = file.reference.countries.clone();
        self
    }

    pub fn load_reference(&self) -> Result<ReferenceTables> {
        ReferenceTables::load(
            self.subdivisions_file.as_deref().map(Path::new),
            self.countries_file.as_deref().map(Path::new),
        )
    }
}

impl ConfigProvider for ReportSettings {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn output_prefix(&self) -> &str {
        &self.output_prefix
    }
}

impl Validate for ReportSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("input", &self.input_file)?;
        validate_path("input", &self.input_file)?;
        validate_path("output_dir", &self.output_dir)?;
        validate_file_prefix("output_prefix", &self.output_prefix)?;

        if let Some(path) = &self.subdivisions_file {
            validate_path("subdivisions", path)?;
            validate_file_extension("subdivisions", path, &["csv"])?;
        }
        if let Some(path) = &self.countries_file {
            validate_path("countries", path)?;
            validate_file_extension("countries", path, &["csv"])?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ctr-report")]
#[command(about = "Aggregate ad impression CSVs into daily per-country click totals")]
pub struct CliConfig {
    /// Input CSV (date, state name, impressions, CTR percentage); prompted for when omitted
    pub input: Option<String>,

    /// Directory for the output file [default: .]
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Replacement ISO 3166-2 subdivision table (columns: code,name)
    #[arg(long)]
    pub subdivisions: Option<String>,

    /// Replacement ISO 3166-1 country table (columns: alpha_2,alpha_3,name)
    #[arg(long)]
    pub countries: Option<String>,

    /// TOML settings file; command line flags take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Layer defaults, then the settings file, then flags.
    pub fn into_settings(self, input_file: String, file: Option<&TomlConfig>) -> ReportSettings {
        let mut settings = ReportSettings::new(input_file);
        if let Some(file) = file {
            settings = settings.with_file_config(file);
        }
        if let Some(dir) = self.output_dir {
            settings.output_dir = dir;
        }
        if self.subdivisions.is_some() {
            settings.subdivisions_file = self.subdivisions;
        }
        if self.countries.is_some() {
            settings.countries_file = self.countries;
        }
        settings
    }
}
