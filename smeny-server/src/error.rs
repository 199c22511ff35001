//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between DB-layer errors (`sqlx::Error`, `BoxError`)
//! and the API-layer error (`AppError`). It enables `?` propagation in handlers
//! without manual `.map_err(...)` boilerplate.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return ServiceError::App(
                        AppError::new(ErrorCode::AlreadyExists)
                            .with_detail("constraint", db_err.constraint().unwrap_or_default()),
                    );
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return ServiceError::App(
                        AppError::conflict("Record is referenced by other records")
                            .with_detail("constraint", db_err.constraint().unwrap_or_default()),
                    );
                }
                Some(NUMERIC_OUT_OF_RANGE) => {
                    return ServiceError::App(AppError::validation("Numeric value out of range"));
                }
                _ => {}
            }
        }
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        ServiceError::App(
            AppError::validation(format!("Invalid fields: {}", fields.join(", ")))
                .with_detail("fields", fields),
        )
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        let err: ServiceError = Payload {
            name: String::new(),
        }
        .validate()
        .unwrap_err()
        .into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::ValidationFailed);
        assert_eq!(app.http_status(), http::StatusCode::BAD_REQUEST);
        assert!(app.message.contains("name"));
    }

    #[test]
    fn test_db_error_hides_detail() {
        let err = ServiceError::Db("connection refused".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn test_non_database_sqlx_error_is_internal() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::Db(_)));
    }

    #[test]
    fn test_app_error_passes_through() {
        let err: ServiceError = AppError::new(ErrorCode::ShiftNotFound).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::ShiftNotFound);
    }
}
