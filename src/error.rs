//! Error types for Smartlogic API operations.

use thiserror::Error;

/// Errors that can occur during Smartlogic API operations.
#[derive(Debug, Error)]
pub enum SmartlogicError {
    /// Configuration is missing or incomplete.
    #[error("Smartlogic configuration required: {0}")]
    ConfigMissing(String),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The HTTP exchange itself failed (connection, DNS, timeout).
    #[error("HTTP error while {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Authentication against the token endpoint failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A data request could not be sent with a valid access token.
    #[error("Authentication failed while {operation} {target}: {source}")]
    Unauthorized {
        operation: &'static str,
        target: String,
        #[source]
        source: AuthError,
    },

    /// The service answered with an unexpected status.
    #[error("Smartlogic API error while {operation} {target}: returned status {status_code}")]
    Service {
        operation: &'static str,
        target: String,
        status_code: u16,
    },

    /// Response body did not have the expected shape.
    #[error("Failed to parse response while {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Failures of the API-key to bearer-token exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request could not be sent or completed.
    #[error("access token request failed: {0}")]
    Exchange(#[source] reqwest::Error),

    /// The token endpoint answered with a non-success status.
    #[error("access token request returned http status {status_code}")]
    Rejected { status_code: u16 },

    /// The token endpoint body carried no usable `access_token`.
    #[error("failed decoding access token in response body: {0}")]
    InvalidTokenResponse(#[source] reqwest::Error),

    /// A 401 was received and a fresh token could not be obtained.
    #[error("failed making request with valid access token: {0}")]
    Refresh(#[source] Box<AuthError>),

    /// Every attempt was answered with 401.
    #[error("failed making request with valid access token after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl SmartlogicError {
    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service { status_code, .. } => Some(*status_code),
            Self::Auth(AuthError::Rejected { status_code })
            | Self::Unauthorized {
                source: AuthError::Rejected { status_code },
                ..
            } => Some(*status_code),
            Self::Transport { source, .. } | Self::Decode { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// Whether the failure came from authentication.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Unauthorized { .. })
    }

    /// The underlying token failure, for both setup and data requests.
    pub fn auth_error(&self) -> Option<&AuthError> {
        match self {
            Self::Auth(source) | Self::Unauthorized { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for Smartlogic operations.
pub type Result<T> = core::result::Result<T, SmartlogicError>;
