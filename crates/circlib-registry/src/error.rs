//! Error types for the registry crate.

use thiserror::Error;

/// A failure reported by the remote collaborator that backs a registry.
///
/// The registry never inspects the message; it only carries it to the
/// caller. `status` is set when the failure came from an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status code, if the collaborator received a response.
    pub status: Option<u16>,
    /// Human-readable description from the collaborator.
    pub message: String,
}

impl TransportError {
    /// Create a transport error without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Create a transport error carrying an HTTP status code.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether the collaborator reported that the requested item does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Errors that can occur in registry lookups.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No instance with this domain name exists after a completed discovery.
    #[error("{service} {name} is not available")]
    NotFound {
        /// Service kind of the registry.
        service: String,
        /// The domain name that was looked up.
        name: String,
    },

    /// No instance is stored under this local identifier.
    #[error("'{service}' registry has no attribute '{identifier}'")]
    AttributeNotFound {
        /// Service kind of the registry.
        service: String,
        /// The identifier that was looked up.
        identifier: String,
    },

    /// Discovery could not reach the remote listing.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
