//! Error types for the Rackspace client.

use crate::backend::BackendError;
use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by the Rackspace client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RackspaceError {
    /// Raised when the high-level configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the driver configuration is missing a required field.
    #[error("invalid driver configuration: {0}")]
    Validation(String),
    /// Raised when the identity service rejects the credentials.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Message returned by the identity service.
        message: String,
    },
    /// Raised when a remote call fails at the network or API layer.
    #[error("provider request failed: {message}")]
    Transport {
        /// Description of the failed request.
        message: String,
    },
    /// Raised when the service catalog has no usable endpoint.
    #[error("no {availability} endpoint for service '{service}' in region {region}")]
    EndpointNotFound {
        /// Service type looked up in the catalog.
        service: String,
        /// Region used for the lookup.
        region: String,
        /// Endpoint visibility tier requested.
        availability: String,
    },
    /// Raised when a sub-client is requested before authentication.
    #[error("provider session has not been authenticated")]
    NotAuthenticated,
    /// Raised when a network identifier is absent from the catalog.
    #[error("network {network_id} not found")]
    NetworkNotFound {
        /// Identifier that failed to resolve.
        network_id: String,
    },
    /// Raised when a provider response has an unexpected shape.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Decoder error message.
        message: String,
    },
    /// Raised for lifecycle operations the provider does not offer.
    #[error("Rackspace does not currently support the {operation} operation")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: String,
    },
}

impl RackspaceError {
    pub(crate) fn unsupported(operation: &str) -> Self {
        Self::UnsupportedOperation {
            operation: operation.to_owned(),
        }
    }

    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for RackspaceError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Validation(field) => Self::Validation(field),
        }
    }
}

impl From<ConfigError> for RackspaceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
