//! Error types for the Swish client

use std::fmt;
use thiserror::Error;

/// Result type alias for Swish operations
pub type Result<T> = std::result::Result<T, SwishError>;

/// Why the client certificate material could not be turned into a secure channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    /// The PKCS#12 archive or root bundle could not be read, or was empty
    SourceUnreadable,
    /// Wrong passphrase or corrupt PKCS#12 archive
    DecryptFailed,
    /// The decrypted PEM blocks do not form a usable certificate/key pair
    KeyPairInvalid,
    /// The root bundle is not valid PEM or holds no usable certificate
    RootBundleInvalid,
}

impl fmt::Display for CredentialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            CredentialFailure::SourceUnreadable => "source unreadable",
            CredentialFailure::DecryptFailed => "decrypt failed",
            CredentialFailure::KeyPairInvalid => "key pair invalid",
            CredentialFailure::RootBundleInvalid => "root bundle invalid",
        };
        f.write_str(reason)
    }
}

/// Main error type for Swish operations
#[derive(Error, Debug)]
pub enum SwishError {
    /// Certificate material could not be loaded
    #[error("Credential error ({reason}): {message}")]
    Credential {
        reason: CredentialFailure,
        message: String,
    },

    /// The supplied HTTP transport cannot take a TLS configuration
    #[error("Unsupported transport: TLS settings can only be installed on a reqwest::ClientBuilder")]
    UnsupportedTransport,

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the call
    #[error("Request cancelled")]
    Cancelled,

    /// Non-success status without a structured error body
    #[error("Bad status code from Swish API: {status}")]
    Status { status: u16 },

    /// Structured error reported by the Swish API.
    ///
    /// Only the first error of a multi-error response is kept.
    #[error("{message}")]
    Api {
        code: String,
        message: String,
        additional_information: Option<String>,
    },

    /// A create call succeeded but returned no usable `Location` header
    #[error("No location header from Swish API")]
    NoLocationHeader,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Amount that is not a decimal number
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SwishError {
    /// Create a credential error
    pub fn credential(reason: CredentialFailure, message: impl Into<String>) -> Self {
        Self::Credential {
            reason,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(value: impl Into<String>) -> Self {
        Self::InvalidAmount {
            value: value.into(),
        }
    }

    /// The credential failure reason, if this is a credential error
    pub fn credential_failure(&self) -> Option<CredentialFailure> {
        match self {
            Self::Credential { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// The HTTP status code carried by a [`SwishError::Status`] error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether the call was aborted by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
