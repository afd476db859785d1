use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure to get a usable answer out of the record gateway.
#[derive(Debug)]
pub enum GatewayError {
    Transport(reqwest::Error),
    Decode(serde_json::Error),
    Status(reqwest::StatusCode),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(err) => write!(f, "gateway request failed: {err}"),
            GatewayError::Decode(err) => write!(f, "gateway reply was not valid JSON: {err}"),
            GatewayError::Status(status) => write!(f, "gateway answered {status}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Transport(err) => Some(err),
            GatewayError::Decode(err) => Some(err),
            GatewayError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

/// Input rejected before anything is sent to the gateway.
///
/// `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields,
    MissingStudentId,
    MissingSearchTerm,
    InvalidProgram(String),
    InvalidYearLevel(String),
    InvalidStudentId,
    InvalidSearchMode(String),
    IncorrectPassword,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => f.write_str("Please fill in all fields."),
            ValidationError::MissingStudentId => f.write_str("Please enter a student ID."),
            ValidationError::MissingSearchTerm => f.write_str("Please enter a search term."),
            ValidationError::InvalidProgram(value) => {
                write!(f, "Please select a valid program (got '{value}').")
            }
            ValidationError::InvalidYearLevel(value) => {
                write!(f, "Please select a year level from 1 to 4 (got '{value}').")
            }
            ValidationError::InvalidStudentId => {
                f.write_str("Please enter a valid numeric student ID.")
            }
            ValidationError::InvalidSearchMode(value) => {
                write!(f, "Unknown search mode '{value}'.")
            }
            ValidationError::IncorrectPassword => f.write_str("Incorrect password"),
        }
    }
}

impl std::error::Error for ValidationError {}
