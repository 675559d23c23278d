use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    #[error("Destination unwritable: {path}: {source}")]
    DestinationUnwritable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SourceUnavailable { .. }
            | EtlError::DestinationUnwritable { .. }
            | EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::MalformedInput { .. }
            | EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::SourceUnavailable { .. }
            | EtlError::DestinationUnwritable { .. }
            | EtlError::IoError(_) => ErrorSeverity::Critical,
            EtlError::CsvError(_)
            | EtlError::MalformedInput { .. }
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::SourceUnavailable { .. } => {
                "Check that the source file exists and is readable"
            }
            EtlError::CsvError(_) => "Check that the source file is valid CSV with a header row",
            EtlError::MalformedInput { .. } => {
                "The source must contain a sequence of records (one field mapping per row)"
            }
            EtlError::DestinationUnwritable { .. } => {
                "Check that the output directory is writable and has free space"
            }
            EtlError::IoError(_) => "Check file permissions and available disk space",
            EtlError::SerializationError(_) => "Check that the source file is valid JSON",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the configuration values and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::SourceUnavailable { path, .. } => {
                format!("Could not read the source dataset at '{}'", path)
            }
            EtlError::CsvError(_) => "The source file could not be parsed as CSV".to_string(),
            EtlError::MalformedInput { message } => {
                format!("The input data has the wrong shape: {}", message)
            }
            EtlError::DestinationUnwritable { path, .. } => {
                format!("Could not write the cleaned dataset to '{}'", path)
            }
            EtlError::IoError(source) => format!("A file operation failed: {}", source),
            EtlError::SerializationError(_) => {
                "The source file could not be parsed as JSON".to_string()
            }
            other => format!("Configuration problem: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
