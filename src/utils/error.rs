use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Could not decode '{path}' as UTF-8 or UTF-16")]
    DecodeError { path: String },

    #[error("Row {row}: expected 4 columns (date, state name, impressions, CTR percentage), found {found}")]
    MalformedRowError { row: usize, found: usize },

    #[error("Row {row}: unable to parse date '{value}'")]
    InvalidDateError { row: usize, value: String },

    #[error("Row {row}: unable to parse CTR percentage '{value}'")]
    InvalidCtrError { row: usize, value: String },

    #[error("Row {row}: clicks for {impressions} impressions at CTR {fraction} are out of range")]
    ClicksOverflowError {
        row: usize,
        impressions: i64,
        fraction: f64,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Reference data error in {source_name}: {message}")]
    ReferenceError { source_name: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{0}")]
    LoadFailed(#[source] Box<EtlError>),

    #[error("{0}")]
    TransformFailed(#[source] Box<EtlError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Load,
    Transform,
    Reference,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::LoadFailed(_)
            | EtlError::DecodeError { .. }
            | EtlError::MalformedRowError { .. } => ErrorCategory::Load,
            EtlError::ReferenceError { .. } => ErrorCategory::Reference,
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            _ => ErrorCategory::Transform,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Load | ErrorCategory::Reference => ErrorSeverity::Critical,
            ErrorCategory::Transform | ErrorCategory::Configuration => ErrorSeverity::High,
        }
    }

    /// The innermost error, with stage wrappers removed.
    pub fn root(&self) -> &EtlError {
        match self {
            EtlError::LoadFailed(inner) | EtlError::TransformFailed(inner) => inner.root(),
            other => other,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::LoadFailed(inner) => format!("Couldn't read the input file: {}", inner.root()),
            EtlError::TransformFailed(inner) => format!(
                "{}\nCouldn't create an output file",
                inner.root()
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            EtlError::IoError(_) => "Check that the file exists in the working directory and is readable",
            EtlError::CsvError(_) => {
                "Each row needs four columns: date, state name, impressions, CTR percentage"
            }
            EtlError::DecodeError { .. } => "Save the input file as UTF-8 or UTF-16",
            EtlError::MalformedRowError { .. } => {
                "Each row needs four columns: date, state name, impressions, CTR percentage"
            }
            EtlError::ProcessingError { .. } => "Re-run with --verbose for details",
            EtlError::InvalidDateError { .. } => "Use a recognizable date such as 2021-01-05",
            EtlError::InvalidCtrError { .. } => "CTR values look like '2.50%'",
            EtlError::ClicksOverflowError { .. } => "Check the impressions and CTR columns for outliers",
            EtlError::ReferenceError { .. } => {
                "Reference CSVs need 'code,name' (subdivisions) and 'alpha_2,alpha_3,name' (countries) headers"
            }
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Review the command line flags and config file"
            }
            EtlError::LoadFailed(_) | EtlError::TransformFailed(_) => "Re-run with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
