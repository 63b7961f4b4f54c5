//! Error types shared by the API facade, the meal composition core and the screens.

use thiserror::Error;

/// Local, recoverable failures. Nothing is sent to the backend when one of these occurs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("This food is already added to the meal")]
    DuplicateFood { food_id: i64 },

    #[error("Please add at least one food item")]
    EmptyMeal,

    #[error("No food at position {index} (meal has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Quantity must be a non-negative number")]
    InvalidQuantity,

    #[error("Invalid barcode format. Must be 8-14 digits.")]
    InvalidBarcode,

    #[error("{0} is required")]
    Blank(&'static str),

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid {field}: {reason}")]
    InvalidProfile {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Start date must not be after end date")]
    InvertedRange,

    #[error("{field} must be a non-negative number")]
    InvalidNutrient { field: &'static str },
}

/// Failures reported by the HTTP facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, body read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 or 403 from the backend.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The payload did not decode into the expected shape.
    #[error("unexpected response format: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Status { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Parse(_) => None,
        }
    }

    /// Message carried by the backend's error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::Status { message, .. }
                if !message.trim().is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Either side of a core operation that validates locally, then calls the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
