//! Error handling for the Hatch & Carry reporting server
//!
//! Provides consistent error responses in English and Indonesian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_id: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Image too large: {0} bytes")]
    ImageTooLarge(usize),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field error carrying an Indonesian message from the shared rules
    pub fn field(field: impl Into<String>, message_id: impl Into<String>) -> Self {
        let message_id = message_id.into();
        AppError::Validation {
            field: field.into(),
            message: format!("Invalid value: {}", message_id),
            message_id,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        match shared::first_validation_message(&errors) {
            Some((field, message)) => AppError::field(field, message),
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_id: message_id.into(),
            field: None,
        }
    }

    fn on(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

impl ErrorResponse {
    pub fn new(detail: ErrorDetail) -> Self {
        Self {
            success: false,
            error: detail,
        }
    }
}

impl AppError {
    pub fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "UNAUTHORIZED",
                    "Missing or invalid Authorization header",
                    "Silakan login terlebih dahulu",
                ),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired", "Sesi telah berakhir"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token", "Token tidak valid"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                    "Anda tidak memiliki akses untuk tindakan ini",
                ),
            ),
            AppError::Validation {
                field,
                message,
                message_id,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_id.clone()).on(field),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "VALIDATION_ERROR",
                    msg.clone(),
                    format!("Data tidak valid: {}", msg),
                ),
            ),
            AppError::ImageTooLarge(size) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorDetail::new(
                    "IMAGE_TOO_LARGE",
                    format!("Image of {} bytes exceeds the upload limit", size),
                    "Ukuran gambar terlalu besar",
                )
                .on("image"),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("{} tidak ditemukan", resource),
                ),
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "EXTERNAL_SERVICE_ERROR",
                    format!("External service error: {}", msg),
                    "Layanan eksternal tidak dapat dihubungi",
                ),
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new(
                    "STORAGE_ERROR",
                    format!("Storage error: {}", msg),
                    "Gagal menyimpan berkas",
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "Terjadi kesalahan pada basis data",
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), "Terjadi kesalahan pada server"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse::new(detail))).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ReportSubmission;
    use validator::Validate;

    #[test]
    fn test_validation_errors_keep_field_and_indonesian_message() {
        let submission: ReportSubmission = serde_json::from_value(serde_json::json!({
            "kebun": "1KSD",
            "afdeling": "A",
            "blok": "1",
            "nomorPP": 99,
            "estimasiSerangga": 10,
            "tanggal": "2023-05-15",
            "waktu": "08:00",
            "kondisiCuaca": "Cerah"
        }))
        .unwrap();
        let err = AppError::from(submission.validate().unwrap_err());
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.field.unwrap().eq_ignore_ascii_case("nomorPP"));
        assert_eq!(detail.message_id, "Nomor PP harus antara 1 dan 35");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::MissingToken.status_and_detail().0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::InsufficientPermissions.status_and_detail().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("Report".into()).status_and_detail().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ImageTooLarge(10).status_and_detail().1.field.as_deref(),
            Some("image")
        );
    }

    #[test]
    fn test_internal_errors_are_generic_for_users() {
        let (status, detail) = AppError::Internal("CSV writer error: closed".into()).status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail.code, "INTERNAL_ERROR");
        assert_eq!(detail.message_id, "Terjadi kesalahan pada server");
        assert!(detail.field.is_none());
    }
}
