//! Error types for cashora-core
//!
//! Every refusal the screens can produce is a `CoreError`. Each variant
//! carries a machine code, a severity, and the title/text used when the
//! refusal is shown to the person as a toast.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    RecordNotFound,
    /// Validation error
    ValidationError,
    /// Rejection without a reason
    MissingReason,
    /// Amount is not a positive number
    InvalidAmount,
    /// Withdrawal without a destination bank
    NoBankSelected,
    /// Send above the current balance
    InsufficientBalance,
    /// Sign-in pair did not match
    InvalidCredentials,
    /// Unauthorized access
    Unauthorized,
    /// Email already used by another user
    DuplicateEntry,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::RecordNotFound => write!(f, "RECORD_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::MissingReason => write!(f, "MISSING_REASON"),
            ErrorCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            ErrorCode::NoBankSelected => write!(f, "NO_BANK_SELECTED"),
            ErrorCode::InsufficientBalance => write!(f, "INSUFFICIENT_BALANCE"),
            ErrorCode::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation refused, nothing changed
    Warning,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Main error type for cashora-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Rejection reason is required")]
    MissingReason,

    #[error("Invalid amount: {input}")]
    InvalidAmount { input: String },

    #[error("No bank selected")]
    NoBankSelected,

    #[error("Insufficient balance: requested {requested}, available {balance}")]
    InsufficientBalance { balance: Decimal, requested: Decimal },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::MissingReason => ErrorCode::MissingReason,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::NoBankSelected => ErrorCode::NoBankSelected,
            CoreError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CoreError::InvalidCredentials => ErrorCode::InvalidCredentials,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::RecordNotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. }
            | CoreError::MissingReason
            | CoreError::InvalidAmount { .. }
            | CoreError::NoBankSelected
            | CoreError::InsufficientBalance { .. }
            | CoreError::InvalidCredentials
            | CoreError::Unauthorized
            | CoreError::DuplicateEntry { .. } => ErrorSeverity::Warning,
        }
    }

    /// Toast title shown when this refusal reaches a screen
    pub fn title(&self) -> &'static str {
        match self {
            CoreError::RecordNotFound { .. } => "Not Found",
            CoreError::ValidationError { .. } => "Validation Failed",
            CoreError::MissingReason => "Rejection Failed",
            CoreError::InvalidAmount { .. } => "Invalid Amount",
            CoreError::NoBankSelected => "Error",
            CoreError::InsufficientBalance { .. } => "Insufficient Balance",
            CoreError::InvalidCredentials => "Sign in failed",
            CoreError::Unauthorized => "Unauthorized",
            CoreError::DuplicateEntry { .. } => "Already Exists",
        }
    }

    /// Toast text shown when this refusal reaches a screen
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ValidationError { message } => message.clone(),
            CoreError::MissingReason => "Please provide a reason for rejection.".to_string(),
            CoreError::InvalidAmount { .. } => "Please enter an amount greater than zero.".to_string(),
            CoreError::NoBankSelected => "Please select a bank".to_string(),
            CoreError::InsufficientBalance { .. } => {
                "You don't have enough balance for this transaction.".to_string()
            }
            CoreError::DuplicateEntry { entry } => {
                format!("A user with the email {} already exists.", entry)
            }
            other => other.to_string(),
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::RecordNotFound { .. } => {
                details = details.with_suggestion(
                    "Check if the record ID is correct.".to_string()
                );
                details = details.with_suggestion(
                    "Use the /api/transactions endpoint to list all transactions.".to_string()
                );
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::InvalidAmount { input } => {
                details = details.with_detail(serde_json::json!({ "input": input }));
                details = details.with_suggestion(
                    "Enter a positive decimal number such as 250 or 99.50.".to_string()
                );
            }
            CoreError::InsufficientBalance { balance, requested } => {
                details = details.with_detail(serde_json::json!({
                    "balance": balance.to_string(),
                    "requested": requested.to_string(),
                }));
            }
            CoreError::NoBankSelected => {
                details = details.with_suggestion(
                    "Pick one of the banks assigned to your account.".to_string()
                );
            }
            CoreError::DuplicateEntry { entry } => {
                details = details.with_detail(serde_json::json!({ "email": entry }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Signed-in email (if any)
    pub user_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            user_id: None,
            operation,
            data: serde_json::json!({}),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);

    /// Log a refusal at the level its severity calls for
    fn log_refusal(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info => self.log_debug(&error.to_string(), context),
            ErrorSeverity::Warning => self.log_warning(&error.to_string(), context),
        }
    }
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "cashora::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "cashora::error",
            "DEBUG: {} - Operation: {} - Data: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::RecordNotFound.to_string(), "RECORD_NOT_FOUND");
        assert_eq!(ErrorCode::MissingReason.to_string(), "MISSING_REASON");
        assert_eq!(ErrorCode::InsufficientBalance.to_string(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn test_error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::NoBankSelected).unwrap();
        assert_eq!(json, "\"NO_BANK_SELECTED\"");
    }

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "info");
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_refusals_are_warnings() {
        assert_eq!(CoreError::MissingReason.severity(), ErrorSeverity::Warning);
        assert_eq!(CoreError::NoBankSelected.severity(), ErrorSeverity::Warning);
        assert_eq!(
            CoreError::RecordNotFound { id: "9".to_string() }.severity(),
            ErrorSeverity::Info
        );
    }

    #[test]
    fn test_toast_text() {
        let error = CoreError::MissingReason;
        assert_eq!(error.title(), "Rejection Failed");
        assert_eq!(error.user_message(), "Please provide a reason for rejection.");

        let error = CoreError::InsufficientBalance { balance: dec!(100), requested: dec!(150) };
        assert_eq!(error.title(), "Insufficient Balance");
        assert_eq!(
            error.user_message(),
            "You don't have enough balance for this transaction."
        );

        let error = CoreError::ValidationError { message: "Email is required".to_string() };
        assert_eq!(error.user_message(), "Email is required");
    }

    #[test]
    fn test_error_details_record_not_found() {
        let error = CoreError::RecordNotFound { id: "42".to_string() };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::RecordNotFound);
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("42"));
    }

    #[test]
    fn test_error_details_insufficient_balance() {
        let error = CoreError::InsufficientBalance { balance: dec!(100), requested: dec!(150.5) };
        let details = error.to_details();
        let detail = details.details.unwrap();
        assert_eq!(detail["requested"], "150.5");
        assert_eq!(detail["balance"], "100");
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("reject_deposit".to_string())
            .with_user_id("admin@cashora.com".to_string())
            .with_data("id", serde_json::json!("2"));

        assert_eq!(context.operation, "reject_deposit");
        assert_eq!(context.user_id.as_deref(), Some("admin@cashora.com"));
        assert_eq!(context.data["id"], "2");
    }

    #[test]
    fn test_duplicate_email_toast() {
        let error = CoreError::DuplicateEntry { entry: "john@example.com".to_string() };
        assert_eq!(error.code(), ErrorCode::DuplicateEntry);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert_eq!(
            error.user_message(),
            "A user with the email john@example.com already exists."
        );
        assert_eq!(error.to_details().details.unwrap()["email"], "john@example.com");
    }

    #[test]
    fn test_error_details_display() {
        let details = ErrorDetails::new(ErrorCode::ValidationError, "Validation failed".to_string())
            .with_suggestion("Check the value".to_string());
        let text = details.to_string();
        assert!(text.starts_with("[VALIDATION_ERROR] Validation failed"));
        assert!(text.contains("  - Check the value"));
    }
}
