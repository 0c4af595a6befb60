use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Errors surfaced by the dashboard service.
///
/// Each variant is recovered at the boundary where it occurs; handlers turn
/// them into JSON responses through [`ResponseError`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Connection settings rejected locally, before any network attempt.
    #[error("invalid connection settings: {0}")]
    ConfigurationInvalid(String),

    /// Request input that fails validation (query parameters, filter selections).
    #[error("invalid request: {0}")]
    Validation(String),

    /// The remote payroll service could not be reached or refused the call.
    #[error("remote service unavailable: {0}")]
    Transport(String),

    /// The remote service answered with something other than the expected document.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Normalized records lack fields required by the aggregations.
    #[error("response is missing expected fields: {}", missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("missing X-Session-Id header")]
    SessionMissing,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("connection settings have not been saved for this session")]
    NotConnected,

    #[error("no data loaded; run a query first")]
    NoData,

    /// Connection settings were saved while the query was running; its result was discarded.
    #[error("connection settings changed while the query was running; run it again")]
    QuerySuperseded,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ConfigurationInvalid(_) => "configuration_invalid",
            AppError::Validation(_) => "validation",
            AppError::Transport(_) => "transport_error",
            AppError::MalformedResponse(_) => "malformed_response",
            AppError::SchemaMismatch { .. } => "schema_mismatch",
            AppError::SessionMissing => "session_missing",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::NotConnected => "not_connected",
            AppError::NoData => "no_data",
            AppError::QuerySuperseded => "query_superseded",
            AppError::Internal(_) => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ConfigurationInvalid(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::SessionMissing => StatusCode::UNAUTHORIZED,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotConnected | AppError::NoData | AppError::QuerySuperseded => {
                StatusCode::CONFLICT
            }
            AppError::Transport(_) | AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::SchemaMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let AppError::SchemaMismatch { missing } = self {
            body["missing"] = json!(missing);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_missing_fields() {
        let err = AppError::SchemaMismatch {
            missing: vec!["ANOCOMP".into(), "VALOR".into()],
        };
        assert_eq!(
            err.to_string(),
            "response is missing expected fields: ANOCOMP, VALOR"
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn transport_and_malformed_are_distinct_kinds() {
        let transport = AppError::Transport("connection refused".into());
        let malformed = AppError::MalformedResponse("not xml".into());
        assert_ne!(transport.kind(), malformed.kind());
        assert_eq!(transport.status_code(), StatusCode::BAD_GATEWAY);
    }
}
