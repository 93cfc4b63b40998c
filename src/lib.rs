pub mod config;
pub mod core;
pub mod domain;
pub mod reference;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig, ReportSettings};
pub use crate::core::{etl::EtlEngine, pipeline::ReportPipeline};
pub use crate::domain::model::{CountryLookup, UNKNOWN_COUNTRY_CODE};
pub use crate::reference::{lookup_country_code, ReferenceTables};
pub use crate::utils::error::{EtlError, Result};

/// Run the whole pipeline against the local filesystem and return the output path.
pub fn generate_report(settings: &ReportSettings, reference: ReferenceTables) -> Result<String> {
    let storage = LocalStorage::new(".".to_string());
    let pipeline = ReportPipeline::new(storage, settings.clone(), reference);
    EtlEngine::new(pipeline).run()
}
