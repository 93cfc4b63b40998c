use crate::domain::model::{Record, Report};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn input_file(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn output_prefix(&self) -> &str;
}

/// Read-only ISO 3166 lookups. Both methods return `None` when nothing matches.
pub trait ReferenceData {
    fn resolve_subdivision(&self, name: &str) -> Option<&str>;
    fn resolve_country(&self, alpha2: &str) -> Option<&str>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<Vec<Record>>;
    fn transform(&self, data: Vec<Record>) -> Result<Report>;
    fn load(&self, report: Report) -> Result<String>;
}
