pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{EnrichedRecord, Record, Report, ReportRow};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ReferenceData, Storage};
pub use crate::utils::error::Result;
