//! Error types for subject lookups

use crate::error::AppError;

/// Result type for subject operations
pub type SubjectResult<T> = std::result::Result<T, SubjectError>;

/// Errors that can occur while serving a subject
#[derive(Debug, thiserror::Error)]
pub enum SubjectError {
    /// Requested page size is above the configured cap
    #[error("Specified limit exceeds maximum of {max}.")]
    LimitExceeded { limit: usize, max: usize },

    /// Availability enrichment failed
    #[error("Availability enrichment failed: {0}")]
    Enrichment(String),
}

impl From<SubjectError> for AppError {
    fn from(err: SubjectError) -> Self {
        match err {
            SubjectError::LimitExceeded { .. } => AppError::Validation(err.to_string()),
            SubjectError::Enrichment(msg) => AppError::Integration {
                integration_source: "availability".to_string(),
                message: msg,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_limit_exceeded_is_client_error() {
        let err = SubjectError::LimitExceeded { limit: 5000, max: 1000 };
        assert_eq!(err.to_string(), "Specified limit exceeds maximum of 1000.");

        let app: AppError = err.into();
        assert_eq!(app.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(app.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_enrichment_maps_to_bad_gateway() {
        let app: AppError = SubjectError::Enrichment("status service down".to_string()).into();
        assert_eq!(app.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(app.error_code(), "INTEGRATION_ERROR");
    }
}
