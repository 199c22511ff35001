//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::UserNotFound
            | Self::CompanyNotFound
            | Self::WorkerNotFound
            | Self::WorkplaceNotFound
            | Self::ShiftNotFound
            | Self::ExchangeRequestNotFound
            | Self::CustomerNotFound
            | Self::InvoiceNotFound
            | Self::DocumentNotFound
            | Self::ReportNotFound
            | Self::EmployeeNotFound
            | Self::ClientNotFound
            | Self::ProjectNotFound
            | Self::AttendanceNotFound
            | Self::PayrollNotFound
            | Self::ApprovalNotFound
            | Self::NotificationNotFound
            | Self::AresSubjectNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::Conflict
            | Self::UsernameExists
            | Self::EmailExists
            | Self::WorkplaceHasShifts
            | Self::ShiftAssigneeChanged
            | Self::ExchangeRequestDecided
            | Self::CustomerHasInvoices
            | Self::InvoiceNumberExists
            | Self::PayrollFinalized
            | Self::ApprovalDecided => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::SessionExpired
            | Self::SessionInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::ManagerRequired
            | Self::CsrfTokenInvalid => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::AresUnavailable | Self::NetworkError | Self::TimeoutError => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
