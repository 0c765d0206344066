use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} for {url}")]
    ApiStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Metadata error for DOI '{doi}': {message}")]
    MetadataError { doi: String, message: String },

    #[error("Missing required column: {column}")]
    MissingColumnError { column: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 資料或處理錯誤
    High,
    /// 外部 API 錯誤
    Medium,
    /// 系統 / 配置錯誤
    Critical,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ApiError(_)
            | EtlError::ApiStatusError { .. }
            | EtlError::SerializationError(_)
            | EtlError::MetadataError { .. } => ErrorSeverity::Medium,
            EtlError::CsvError(_)
            | EtlError::MissingColumnError { .. }
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::IoError(_)
            | EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) => format!("Could not reach the metadata service: {}", e),
            EtlError::ApiStatusError { url, status } => {
                format!("Metadata service answered {} for {}", status, url)
            }
            EtlError::SerializationError(e) => {
                format!("Metadata service returned malformed JSON: {}", e)
            }
            EtlError::MissingColumnError { column } => {
                format!("Input table has no '{}' column", column)
            }
            EtlError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.severity() {
            ErrorSeverity::Medium => "Check the DOI and network connectivity, then re-run",
            ErrorSeverity::High => "Check that the input table has 'doi' and 'ref_text' columns",
            ErrorSeverity::Critical => "Check the file paths and configuration values",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_severity() {
        let api = EtlError::ApiStatusError {
            url: "https://api.crossref.org/works/x".to_string(),
            status: 404,
        };
        assert_eq!(api.exit_code(), 2);

        let column = EtlError::MissingColumnError {
            column: "doi".to_string(),
        };
        assert_eq!(column.exit_code(), 1);
        assert!(column.user_friendly_message().contains("'doi'"));

        let config = EtlError::ConfigError {
            message: "TOML parsing error".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::Critical);
    }
}
