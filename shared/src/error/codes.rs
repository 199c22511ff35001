//! Unified error codes for the Směny backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors (users, workers, registration)
//! - 4xxx: Scheduling errors (workplaces, shifts, exchange requests)
//! - 5xxx: Invoicing errors (customers, invoices)
//! - 6xxx: Document and report errors
//! - 7xxx: Workflow errors (employees, projects, payroll, approvals)
//! - 8xxx: External service errors (ARES)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire so the
/// front-end can switch on them without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from one client
    TooManyRequests = 9,
    /// Conflicting state change
    Conflict = 10,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Session has expired
    SessionExpired = 1003,
    /// Session token is invalid or revoked
    SessionInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// CSRF token missing or mismatched
    CsrfTokenInvalid = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,
    /// Company (or admin) role required
    ManagerRequired = 2003,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Username already taken
    UsernameExists = 3002,
    /// E-mail already registered
    EmailExists = 3003,
    /// Referenced company does not exist
    CompanyNotFound = 3004,
    /// Worker not found
    WorkerNotFound = 3005,
    /// Role not allowed for this operation
    InvalidRole = 3006,
    /// Password is too short
    PasswordTooShort = 3007,
    /// Current password does not match
    PasswordMismatch = 3008,

    // ==================== 4xxx: Scheduling ====================
    /// Workplace not found
    WorkplaceNotFound = 4001,
    /// Workplace still referenced by shifts
    WorkplaceHasShifts = 4002,
    /// Shift not found
    ShiftNotFound = 4101,
    /// Shift is not assigned to the expected user
    ShiftNotAssigned = 4102,
    /// Shift assignee changed since the exchange was requested
    ShiftAssigneeChanged = 4103,
    /// Invalid shift time range
    InvalidShiftTime = 4104,
    /// Exchange request not found
    ExchangeRequestNotFound = 4201,
    /// Exchange request already decided
    ExchangeRequestDecided = 4202,
    /// Exchange between identical shifts
    ExchangeSameShift = 4203,
    /// Exchange across companies
    ExchangeCrossCompany = 4204,

    // ==================== 5xxx: Invoicing ====================
    /// Customer not found
    CustomerNotFound = 5001,
    /// Customer still referenced by invoices
    CustomerHasInvoices = 5002,
    /// Invoice not found
    InvoiceNotFound = 5101,
    /// Invoice number already used by this issuer
    InvoiceNumberExists = 5102,
    /// Invoice has no items
    InvoiceEmpty = 5103,

    // ==================== 6xxx: Documents ====================
    /// Document not found
    DocumentNotFound = 6001,
    /// Uploaded file exceeds the size limit
    FileTooLarge = 6002,
    /// File extension not allowed
    UnsupportedFileFormat = 6003,
    /// Multipart request carried no file
    NoFileProvided = 6004,
    /// Uploaded file is empty
    EmptyFile = 6005,
    /// Writing or reading the file failed
    FileStorageFailed = 6006,
    /// Report not found
    ReportNotFound = 6101,

    // ==================== 7xxx: Workflow ====================
    /// Employee not found
    EmployeeNotFound = 7001,
    /// Client not found
    ClientNotFound = 7101,
    /// Project not found
    ProjectNotFound = 7201,
    /// Attendance record not found
    AttendanceNotFound = 7301,
    /// Hours outside (0, 24]
    InvalidHours = 7302,
    /// Payroll run not found
    PayrollNotFound = 7401,
    /// Payroll run already finalized
    PayrollFinalized = 7402,
    /// No attendance in the payroll period
    PayrollEmpty = 7403,
    /// Approval not found
    ApprovalNotFound = 7501,
    /// Approval already decided
    ApprovalDecided = 7502,
    /// Notification not found
    NotificationNotFound = 7601,

    // ==================== 8xxx: External ====================
    /// IČO has wrong length or checksum
    InvalidIco = 8001,
    /// ARES knows no subject with this IČO
    AresSubjectNotFound = 8002,
    /// ARES could not be reached
    AresUnavailable = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, please try again later",
            ErrorCode::Conflict => "Conflicting change",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::SessionInvalid => "Invalid session",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::CsrfTokenInvalid => "Invalid CSRF token",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Admin role required",
            ErrorCode::ManagerRequired => "Company role required",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "E-mail already registered",
            ErrorCode::CompanyNotFound => "Company not found",
            ErrorCode::WorkerNotFound => "Worker not found",
            ErrorCode::InvalidRole => "Role not allowed",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::PasswordMismatch => "Current password is incorrect",

            // Scheduling
            ErrorCode::WorkplaceNotFound => "Workplace not found",
            ErrorCode::WorkplaceHasShifts => "Workplace has shifts",
            ErrorCode::ShiftNotFound => "Shift not found",
            ErrorCode::ShiftNotAssigned => "Shift is not assigned to this user",
            ErrorCode::ShiftAssigneeChanged => "Shift assignment changed since the request",
            ErrorCode::InvalidShiftTime => "Invalid shift time",
            ErrorCode::ExchangeRequestNotFound => "Exchange request not found",
            ErrorCode::ExchangeRequestDecided => "Exchange request already decided",
            ErrorCode::ExchangeSameShift => "Cannot exchange a shift with itself",
            ErrorCode::ExchangeCrossCompany => "Both workers must belong to the same company",

            // Invoicing
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerHasInvoices => "Customer has invoices",
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceNumberExists => "Invoice number already exists",
            ErrorCode::InvoiceEmpty => "Invoice must have at least one item",

            // Documents
            ErrorCode::DocumentNotFound => "Document not found",
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "File is empty",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::ReportNotFound => "Report not found",

            // Workflow
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::InvalidHours => "Hours must be greater than 0 and at most 24",
            ErrorCode::PayrollNotFound => "Payroll run not found",
            ErrorCode::PayrollFinalized => "Payroll run already finalized",
            ErrorCode::PayrollEmpty => "No attendance in this period",
            ErrorCode::ApprovalNotFound => "Approval not found",
            ErrorCode::ApprovalDecided => "Approval already decided",
            ErrorCode::NotificationNotFound => "Notification not found",

            // External
            ErrorCode::InvalidIco => "Invalid IČO",
            ErrorCode::AresSubjectNotFound => "Subject not found in ARES",
            ErrorCode::AresUnavailable => "ARES is unavailable",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),
            10 => Ok(ErrorCode::Conflict),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::SessionExpired),
            1004 => Ok(ErrorCode::SessionInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::CsrfTokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),
            2003 => Ok(ErrorCode::ManagerRequired),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::UsernameExists),
            3003 => Ok(ErrorCode::EmailExists),
            3004 => Ok(ErrorCode::CompanyNotFound),
            3005 => Ok(ErrorCode::WorkerNotFound),
            3006 => Ok(ErrorCode::InvalidRole),
            3007 => Ok(ErrorCode::PasswordTooShort),
            3008 => Ok(ErrorCode::PasswordMismatch),

            // Scheduling
            4001 => Ok(ErrorCode::WorkplaceNotFound),
            4002 => Ok(ErrorCode::WorkplaceHasShifts),
            4101 => Ok(ErrorCode::ShiftNotFound),
            4102 => Ok(ErrorCode::ShiftNotAssigned),
            4103 => Ok(ErrorCode::ShiftAssigneeChanged),
            4104 => Ok(ErrorCode::InvalidShiftTime),
            4201 => Ok(ErrorCode::ExchangeRequestNotFound),
            4202 => Ok(ErrorCode::ExchangeRequestDecided),
            4203 => Ok(ErrorCode::ExchangeSameShift),
            4204 => Ok(ErrorCode::ExchangeCrossCompany),

            // Invoicing
            5001 => Ok(ErrorCode::CustomerNotFound),
            5002 => Ok(ErrorCode::CustomerHasInvoices),
            5101 => Ok(ErrorCode::InvoiceNotFound),
            5102 => Ok(ErrorCode::InvoiceNumberExists),
            5103 => Ok(ErrorCode::InvoiceEmpty),

            // Documents
            6001 => Ok(ErrorCode::DocumentNotFound),
            6002 => Ok(ErrorCode::FileTooLarge),
            6003 => Ok(ErrorCode::UnsupportedFileFormat),
            6004 => Ok(ErrorCode::NoFileProvided),
            6005 => Ok(ErrorCode::EmptyFile),
            6006 => Ok(ErrorCode::FileStorageFailed),
            6101 => Ok(ErrorCode::ReportNotFound),

            // Workflow
            7001 => Ok(ErrorCode::EmployeeNotFound),
            7101 => Ok(ErrorCode::ClientNotFound),
            7201 => Ok(ErrorCode::ProjectNotFound),
            7301 => Ok(ErrorCode::AttendanceNotFound),
            7302 => Ok(ErrorCode::InvalidHours),
            7401 => Ok(ErrorCode::PayrollNotFound),
            7402 => Ok(ErrorCode::PayrollFinalized),
            7403 => Ok(ErrorCode::PayrollEmpty),
            7501 => Ok(ErrorCode::ApprovalNotFound),
            7502 => Ok(ErrorCode::ApprovalDecided),
            7601 => Ok(ErrorCode::NotificationNotFound),

            // External
            8001 => Ok(ErrorCode::InvalidIco),
            8002 => Ok(ErrorCode::AresSubjectNotFound),
            8003 => Ok(ErrorCode::AresUnavailable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::TooManyRequests.code(), 9);
        assert_eq!(ErrorCode::CsrfTokenInvalid.code(), 1006);
        assert_eq!(ErrorCode::ManagerRequired.code(), 2003);
        assert_eq!(ErrorCode::UsernameExists.code(), 3002);
        assert_eq!(ErrorCode::ShiftAssigneeChanged.code(), 4103);
        assert_eq!(ErrorCode::InvoiceNotFound.code(), 5101);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6002);
        assert_eq!(ErrorCode::PayrollFinalized.code(), 7402);
        assert_eq!(ErrorCode::AresUnavailable.code(), 8003);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1006), Ok(ErrorCode::CsrfTokenInvalid));
        assert_eq!(ErrorCode::try_from(4202), Ok(ErrorCode::ExchangeRequestDecided));
        assert_eq!(ErrorCode::try_from(7302), Ok(ErrorCode::InvalidHours));
        assert_eq!(ErrorCode::try_from(9005), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_roundtrip_every_listed_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Conflict,
            ErrorCode::SessionInvalid,
            ErrorCode::AdminRequired,
            ErrorCode::PasswordMismatch,
            ErrorCode::ExchangeCrossCompany,
            ErrorCode::InvoiceEmpty,
            ErrorCode::ReportNotFound,
            ErrorCode::NotificationNotFound,
            ErrorCode::InvalidIco,
            ErrorCode::TimeoutError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::ShiftNotFound).unwrap();
        assert_eq!(json, "4101");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("5102").unwrap();
        assert_eq!(code, ErrorCode::InvoiceNumberExists);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", ErrorCode::AresUnavailable), "8003");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::CsrfTokenInvalid.message(), "Invalid CSRF token");
        assert_eq!(
            ErrorCode::PasswordTooShort.message(),
            "Password must be at least 8 characters"
        );
    }

    #[test]
    fn test_invalid_error_code_display() {
        assert_eq!(InvalidErrorCode(4242).to_string(), "invalid error code: 4242");
    }
}
