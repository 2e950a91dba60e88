//! Error types for the template catalog.

use circlib_qasm::QasmError;
use circlib_registry::{RegistryError, TransportError};
use thiserror::Error;

/// Errors that can occur when looking up or instantiating templates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// The name is not in a fully discovered catalog.
    #[error("{service} {name} is not available")]
    NotFound { service: String, name: String },

    /// Instantiation arguments violate the template's parameters.
    ///
    /// `names` lists every offending argument; `message` groups them by
    /// category.
    #[error("{message}")]
    BadArguments {
        template: String,
        names: Vec<String>,
        message: String,
    },

    /// The server answered with something that breaks the protocol.
    #[error("{0}")]
    Protocol(String),

    /// No entry is stored under this local identifier.
    #[error("'{service}' catalog has no attribute '{identifier}'")]
    AttributeNotFound { service: String, identifier: String },

    /// The catalog service could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A remote gate could not be encoded or decoded.
    #[error("QASM error: {0}")]
    Qasm(#[from] QasmError),

    /// Any other registry failure.
    #[error(transparent)]
    Registry(RegistryError),
}

impl From<RegistryError> for CatalogError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { service, name } => CatalogError::NotFound { service, name },
            RegistryError::AttributeNotFound {
                service,
                identifier,
            } => CatalogError::AttributeNotFound {
                service,
                identifier,
            },
            RegistryError::Transport(e) => CatalogError::Transport(e),
            other => CatalogError::Registry(other),
        }
    }
}

impl CatalogError {
    /// Offending argument names, for [`CatalogError::BadArguments`].
    pub fn bad_argument_names(&self) -> &[String] {
        match self {
            CatalogError::BadArguments { names, .. } => names,
            _ => &[],
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
