use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skybook_core::{BookingError, InventoryError, StoreError, ValidationErrors};

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    BadRequest(String),
    ValidationError(ValidationErrors),
    NotFoundError(String),
    ConflictError(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "details": errors,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidRequest(msg) => AppError::BadRequest(msg),
            BookingError::Validation(errors) => AppError::ValidationError(errors),
            BookingError::Conflict(msg) => AppError::ConflictError(msg),
            BookingError::NotFound(msg) => AppError::NotFoundError(msg),
            e @ BookingError::Unavailable(_) => AppError::ServiceUnavailable(e.to_string()),
            // Seats may still be held; the operator needs the whole story in the log.
            e @ BookingError::CompensationFailed { .. } => AppError::InternalServerError(e.to_string()),
            BookingError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            e @ InventoryError::NotFound(_) => AppError::NotFoundError(e.to_string()),
            e @ (InventoryError::InsufficientSeats { .. } | InventoryError::Duplicate) => {
                AppError::ConflictError(e.to_string())
            }
            e @ (InventoryError::InvalidFlight(_) | InventoryError::InvalidSeatCount) => {
                AppError::BadRequest(e.to_string())
            }
            e @ InventoryError::Unavailable(_) => AppError::ServiceUnavailable(e.to_string()),
            InventoryError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::ConflictError(msg),
            StoreError::NotFound(msg) => AppError::NotFoundError(msg),
            StoreError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}
