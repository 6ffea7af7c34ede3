use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

/// Error taxonomy shared by every service. Each variant maps to the HTTP
/// status the handlers answer with; internal variants never leak detail
/// to clients.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Authentication(String),
    Conflict(String),
    Database(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message exposed in the JSON body. Database/internal failures answer
    /// with a generic message, the real cause stays in the logs.
    fn client_message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Authentication(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Database(_) | AppError::Internal(_) => "Internal server error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
            log::error!("❌ {}", self);
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.client_message()
        }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("missing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Authentication("nope".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AppError::Database("connection refused at 10.0.0.5:27017".into());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AppError::NotFound("Product not found".into());
        assert_eq!(err.client_message(), "Product not found");
    }
}
