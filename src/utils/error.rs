use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcUtilsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Country not found: '{input}'")]
    CountryNotFound { input: String },

    #[error("EU country codes are of length 2, yours is '{code}'.")]
    InvalidEuCountryCode { code: String },

    #[error("Dimension not found: '{dim}'")]
    DimensionNotFound { dim: String },

    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Duplicate label '{label}' in dimension '{dim}'")]
    DuplicateLabel { dim: String, label: String },

    #[error("Prefix not found: {prefix}.")]
    PrefixNotFound { prefix: String },

    #[error("Only .dot files can be processed.")]
    InvalidGraphFile { path: String },

    #[error("DOT parse error at line {line}: {message}")]
    DotParseError { line: usize, message: String },

    #[error("Graph rendering failed: {message}")]
    RenderError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: '{field}'")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EcUtilsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Lookup,
    Data,
    Graph,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EcUtilsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EcUtilsError::IoError(_) | EcUtilsError::CsvError(_) => ErrorCategory::Io,
            EcUtilsError::SerializationError(_) => ErrorCategory::Io,
            EcUtilsError::CountryNotFound { .. } | EcUtilsError::InvalidEuCountryCode { .. } => {
                ErrorCategory::Lookup
            }
            EcUtilsError::DimensionNotFound { .. }
            | EcUtilsError::ShapeMismatch { .. }
            | EcUtilsError::DuplicateLabel { .. }
            | EcUtilsError::ProcessingError { .. } => ErrorCategory::Data,
            EcUtilsError::PrefixNotFound { .. }
            | EcUtilsError::InvalidGraphFile { .. }
            | EcUtilsError::DotParseError { .. }
            | EcUtilsError::RenderError { .. } => ErrorCategory::Graph,
            EcUtilsError::ConfigValidationError { .. }
            | EcUtilsError::InvalidConfigValueError { .. }
            | EcUtilsError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Graph => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EcUtilsError::CountryNotFound { .. } => {
                "Use an ISO 3166-1 alpha-2/alpha-3 code, a numeric code or a country name, or pass --errors ignore".to_string()
            }
            EcUtilsError::InvalidEuCountryCode { .. } => {
                "EU country codes have exactly two letters, e.g. 'EL' or 'UK'".to_string()
            }
            EcUtilsError::DimensionNotFound { dim } => {
                format!("Check that the input data has a '{}' column", dim)
            }
            EcUtilsError::ShapeMismatch { .. } | EcUtilsError::DuplicateLabel { .. } => {
                "Check the input data for duplicated or missing rows".to_string()
            }
            EcUtilsError::PrefixNotFound { .. } => {
                "Module prefixes must match the start of at least one rule label".to_string()
            }
            EcUtilsError::InvalidGraphFile { .. } => {
                "Generate the rule graph with `snakemake --rulegraph > rulegraph.dot`".to_string()
            }
            EcUtilsError::DotParseError { .. } => {
                "Make sure the file is a DOT graph produced by snakemake".to_string()
            }
            EcUtilsError::RenderError { .. } => {
                "Install Graphviz or write the module graph with --format dot".to_string()
            }
            EcUtilsError::ConfigValidationError { .. }
            | EcUtilsError::InvalidConfigValueError { .. }
            | EcUtilsError::MissingConfigError { .. } => {
                "Check the configuration file and command line flags".to_string()
            }
            EcUtilsError::IoError(_) => "Check that the file exists and is accessible".to_string(),
            EcUtilsError::CsvError(_) => "Check that the CSV file is well formed".to_string(),
            EcUtilsError::SerializationError(_) | EcUtilsError::ProcessingError { .. } => {
                "Re-run with --verbose for more details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Lookup => format!("Lookup failed: {}", self),
            ErrorCategory::Data => format!("Data processing failed: {}", self),
            ErrorCategory::Graph => format!("Module graph failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}
