use thiserror::Error;

/// Message the NS1 account API returns for a missing user. The API has no
/// structured error kind for this, so callers fall back to matching the text.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

#[derive(Debug, Error)]
pub enum Ns1Error {
    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to parse NS1 response: {0}")]
    ParseError(String),

    #[error("Field {field} expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Invalid provider configuration: {0}")]
    ConfigError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl Ns1Error {
    /// True when the error means the remote object no longer exists.
    ///
    /// The structured `NotFound` kind is checked first; errors from clients
    /// that only carry text are matched on `"User not found"`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Ns1Error::NotFound(_) => true,
            other => other.to_string().contains(USER_NOT_FOUND_MESSAGE),
        }
    }
}

impl From<reqwest::Error> for Ns1Error {
    fn from(error: reqwest::Error) -> Self {
        Ns1Error::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for Ns1Error {
    fn from(error: serde_json::Error) -> Self {
        Ns1Error::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for Ns1Error {
    fn from(error: anyhow::Error) -> Self {
        Ns1Error::GeneralError(error.to_string())
    }
}
