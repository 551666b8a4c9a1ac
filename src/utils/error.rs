use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Query rejected with status {status}: {message}")]
    QueryRejected { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdminError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdminError::ApiError(_) => ErrorSeverity::Medium,
            AdminError::QueryRejected { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            AdminError::QueryRejected { .. } => ErrorSeverity::High,
            AdminError::SerializationError(_) | AdminError::UnexpectedResponse { .. } => {
                ErrorSeverity::High
            }
            AdminError::ConfigError { .. }
            | AdminError::MissingConfigError { .. }
            | AdminError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            AdminError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdminError::ApiError(e) if e.is_timeout() => {
                "The database did not answer in time".to_string()
            }
            AdminError::ApiError(_) => "Could not reach the database service".to_string(),
            AdminError::QueryRejected { status, message } => {
                format!("The database rejected the query ({}): {}", status, message)
            }
            AdminError::MissingConfigError { field } => {
                format!("Missing configuration: {} must be set", field)
            }
            AdminError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_high_severity() {
        let err = AdminError::MissingConfigError {
            field: "SUPABASE_URL".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("SUPABASE_URL"));
    }

    #[test]
    fn server_side_query_failures_are_retryable() {
        let err = AdminError::QueryRejected {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = AdminError::QueryRejected {
            status: 404,
            message: "relation does not exist".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
